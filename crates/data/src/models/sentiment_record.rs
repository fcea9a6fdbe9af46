//! Scored sentiment data model.

use chrono::{DateTime, Utc};
use crowd_pulse_core::{DataMode, SentimentLabel};
use serde::{Deserialize, Serialize};

/// One classification of one post.
///
/// Immutable after creation: re-scoring with a new model produces a new row
/// under a new `model_version` rather than mutating history — `(post_id,
/// model_version)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SentimentRecordRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub id: Option<i64>,
    pub post_id: i64,
    pub symbol: Option<String>,
    /// "positive", "negative", or "neutral"
    pub label: String,
    /// Classification probability in [0, 1]
    pub score: f64,
    pub model_version: String,
    pub scored_at: DateTime<Utc>,
    pub data_mode: String,
}

impl SentimentRecordRow {
    #[must_use]
    pub fn new(
        post_id: i64,
        symbol: Option<String>,
        label: SentimentLabel,
        score: f64,
        model_version: impl Into<String>,
        scored_at: DateTime<Utc>,
        mode: DataMode,
    ) -> Self {
        Self {
            id: None,
            post_id,
            symbol,
            label: label.as_str().to_string(),
            score: score.clamp(0.0, 1.0),
            model_version: model_version.into(),
            scored_at,
            data_mode: mode.as_str().to_string(),
        }
    }

    /// Returns the parsed label.
    #[must_use]
    pub fn parsed_label(&self) -> Option<SentimentLabel> {
        SentimentLabel::parse(&self.label)
    }

    /// Signed sentiment value, optionally weighted by probability.
    #[must_use]
    pub fn signed_score(&self, weight_by_probability: bool) -> f64 {
        let signed = self.parsed_label().map_or(0.0, |l| l.signed_value());
        if weight_by_probability {
            signed * self.score
        } else {
            signed
        }
    }
}
