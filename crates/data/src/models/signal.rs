//! Divergence signal data model.
//!
//! The engine's primary output: one row per `(symbol, bucket, mode)`,
//! upsert-on-conflict, never duplicated. Rows are read-only to every other
//! component and superseded (not deleted) by later recomputation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SignalRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub id: Option<i64>,
    pub symbol: String,
    /// Hour-aligned computation bucket (UTC)
    pub bucket: DateTime<Utc>,
    /// Mean signed sentiment over the computation window
    pub sentiment_score_avg: Option<f64>,
    /// Count of scored records in the window
    pub discussion_volume: Option<i32>,
    /// 0–100 normalised rate of change of mean sentiment
    pub sentiment_velocity: Option<f64>,
    pub velocity_window_minutes: Option<i32>,
    /// z(discussion volume) − z(delivery volume), in z-score units
    pub divergence_score: Option<f64>,
    /// "hype", "panic", or "neutral"
    pub divergence_direction: Option<String>,
    /// Weighted blend of the three sub-scores, in [0, 1]
    pub confidence_score: Option<f64>,
    pub model_certainty: Option<f64>,
    pub data_sufficiency: Option<f64>,
    pub signal_consistency: Option<f64>,
    pub computed_at: DateTime<Utc>,
    pub data_mode: String,
}

impl SignalRecord {
    /// Returns the parsed direction.
    #[must_use]
    pub fn parsed_direction(&self) -> Option<DivergenceDirection> {
        self.divergence_direction
            .as_deref()
            .and_then(DivergenceDirection::parse)
    }
}

/// Directional classification of a divergence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivergenceDirection {
    /// Discussion surging faster than real participation
    Hype,
    /// Discussion collapsing relative to participation
    Panic,
    /// Inside the threshold band
    Neutral,
}

impl DivergenceDirection {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DivergenceDirection::Hype => "hype",
            DivergenceDirection::Panic => "panic",
            DivergenceDirection::Neutral => "neutral",
        }
    }

    /// Parses from string (non-failing version).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hype" => Some(Self::Hype),
            "panic" => Some(Self::Panic),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl std::str::FromStr for DivergenceDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| anyhow::anyhow!("Invalid divergence direction: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bucket() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 7, 14, 0, 0).unwrap()
    }

    #[test]
    fn direction_as_str_roundtrips() {
        for direction in [
            DivergenceDirection::Hype,
            DivergenceDirection::Panic,
            DivergenceDirection::Neutral,
        ] {
            assert_eq!(DivergenceDirection::parse(direction.as_str()), Some(direction));
        }
    }

    #[test]
    fn direction_parse_case_insensitive() {
        assert_eq!(DivergenceDirection::parse("HYPE"), Some(DivergenceDirection::Hype));
        assert_eq!(DivergenceDirection::parse("sideways"), None);
    }

    #[test]
    fn record_parsed_direction() {
        let record = SignalRecord {
            id: None,
            symbol: "RELIANCE".to_string(),
            bucket: sample_bucket(),
            sentiment_score_avg: Some(0.42),
            discussion_volume: Some(37),
            sentiment_velocity: Some(61.5),
            velocity_window_minutes: Some(60),
            divergence_score: Some(2.1),
            divergence_direction: Some("hype".to_string()),
            confidence_score: Some(0.71),
            model_certainty: Some(0.8),
            data_sufficiency: Some(0.37),
            signal_consistency: Some(0.9),
            computed_at: sample_bucket(),
            data_mode: "test".to_string(),
        };

        assert_eq!(record.parsed_direction(), Some(DivergenceDirection::Hype));
    }

    #[test]
    fn record_serializes_without_null_id() {
        let record = SignalRecord {
            id: None,
            symbol: "TCS".to_string(),
            bucket: sample_bucket(),
            sentiment_score_avg: None,
            discussion_volume: None,
            sentiment_velocity: None,
            velocity_window_minutes: None,
            divergence_score: None,
            divergence_direction: None,
            confidence_score: None,
            model_certainty: None,
            data_sufficiency: None,
            signal_consistency: None,
            computed_at: sample_bucket(),
            data_mode: "test".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"id\":null"));
        assert!(json.contains("\"symbol\":\"TCS\""));
    }
}
