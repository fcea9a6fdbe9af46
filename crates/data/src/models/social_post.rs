//! Raw social post data model.

use chrono::{DateTime, Utc};
use crowd_pulse_core::{DataMode, RawPost};
use serde::{Deserialize, Serialize};

/// A raw text record ingested from a discussion source.
///
/// `(source, source_id)` is unique; re-ingesting the same item is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SocialPostRecord {
    /// Auto-generated ID (optional for new records)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub id: Option<i64>,
    /// Originating service name (e.g. "telegram")
    pub source: String,
    /// Target symbol, if attributed
    pub symbol: Option<String>,
    /// Original text as scraped
    pub raw_text: String,
    /// Normalised text, filled during scoring
    pub cleaned_text: Option<String>,
    pub author: Option<String>,
    /// Source-native identifier; dedup key together with `source`
    pub source_id: String,
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub ingested_at: Option<DateTime<Utc>>,
    /// Test/live partition
    pub data_mode: String,
}

impl SocialPostRecord {
    /// Builds a record from an adapter's raw post for the given mode.
    #[must_use]
    pub fn from_raw(post: &RawPost, mode: DataMode) -> Self {
        Self {
            id: None,
            source: post.source.as_str().to_string(),
            symbol: post.symbol.clone(),
            raw_text: post.raw_text.clone(),
            cleaned_text: None,
            author: post.author.clone(),
            source_id: post.source_id.clone(),
            posted_at: Some(post.posted_at),
            ingested_at: None,
            data_mode: mode.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowd_pulse_core::Service;

    #[test]
    fn from_raw_copies_dedup_key() {
        let raw = RawPost {
            source: Service::Youtube,
            symbol: None,
            raw_text: "TCS results look solid".to_string(),
            author: Some("yt_user_7".to_string()),
            source_id: "yt_abc123".to_string(),
            posted_at: Utc::now(),
        };

        let record = SocialPostRecord::from_raw(&raw, DataMode::Live);

        assert_eq!(record.source, "youtube");
        assert_eq!(record.source_id, "yt_abc123");
        assert_eq!(record.data_mode, "live");
        assert!(record.id.is_none());
        assert!(record.cleaned_text.is_none());
    }
}
