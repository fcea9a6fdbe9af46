use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub signal: SignalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/crowd_pulse".to_string(),
            max_connections: 10,
        }
    }
}

/// Daily call budgets per external service.
///
/// Defaults mirror the free-tier caps of the upstream providers; edit the
/// `[quota]` section of `config/Config.toml` for production keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub telegram: u32,
    pub youtube: u32,
    pub twitter: u32,
    pub market: u32,
    pub scoring: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            telegram: 200,
            youtube: 500,
            twitter: 50,
            market: 500,
            scoring: 1500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Wall-clock timeout for a single source fetch, in seconds.
    pub source_timeout_secs: u64,
    /// Maximum records requested from a discussion source per step.
    pub fetch_budget: u32,
    /// Maximum posts scored per scoring pass.
    pub scoring_batch_size: i64,
    /// Discussion feed endpoints, one per service. Empty URL = not configured.
    pub telegram_feed_url: String,
    pub youtube_feed_url: String,
    pub twitter_feed_url: String,
    /// Daily OHLCV + delivery feed endpoint.
    pub market_feed_url: String,
    /// Remote sentiment model endpoint. Empty = use the built-in lexicon scorer.
    pub scoring_url: String,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: 60,
            fetch_budget: 200,
            scoring_batch_size: 200,
            telegram_feed_url: String::new(),
            youtube_feed_url: String::new(),
            twitter_feed_url: String::new(),
            market_feed_url: String::new(),
            scoring_url: String::new(),
        }
    }
}

/// Tuning for the divergence / velocity / confidence computations.
///
/// The divergence thresholds and confidence weights are deliberately
/// configuration rather than constants: they need empirical tuning per
/// symbol liquidity and the shipped defaults are unvalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Divergence z-score at or above which direction is "hype".
    pub hype_threshold: f64,
    /// Divergence z-score at or below which direction is "panic".
    pub panic_threshold: f64,
    /// Trailing buckets used for rolling z-score normalisation.
    pub zscore_lookback: usize,
    /// Trailing signal rows used for the consistency sub-score.
    pub consistency_lookback: usize,
    /// Variance of recent divergence scores mapping to zero consistency.
    pub consistency_variance_scale: f64,
    /// Expected record volume per bucket for full data sufficiency.
    pub target_record_count: u32,
    /// Velocity windows in minutes, shortest first.
    pub velocity_windows_minutes: Vec<i64>,
    /// Minimum records per velocity sub-window before a window counts.
    pub velocity_min_records: usize,
    /// Weight sentiment observations by classification probability.
    pub weight_by_probability: bool,
    /// Confidence blend weights.
    pub weight_model_certainty: f64,
    pub weight_data_sufficiency: f64,
    pub weight_signal_consistency: f64,
    /// Hours of sentiment history pulled into each computation cycle.
    pub lookback_hours: i64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            hype_threshold: 1.5,
            panic_threshold: -1.5,
            zscore_lookback: 14,
            consistency_lookback: 12,
            consistency_variance_scale: 4.0,
            target_record_count: 100,
            velocity_windows_minutes: vec![5, 60, 1440],
            velocity_min_records: 5,
            weight_by_probability: true,
            weight_model_certainty: 0.4,
            weight_data_sufficiency: 0.3,
            weight_signal_consistency: 0.3,
            lookback_hours: 24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_limits() {
        let config = AppConfig::default();
        assert_eq!(config.quota.telegram, 200);
        assert_eq!(config.quota.twitter, 50);
        assert_eq!(config.quota.scoring, 1500);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn default_signal_config_matches_stated_defaults() {
        let signal = SignalConfig::default();
        assert!((signal.hype_threshold - 1.5).abs() < f64::EPSILON);
        assert!((signal.panic_threshold + 1.5).abs() < f64::EPSILON);
        assert!((signal.weight_model_certainty - 0.4).abs() < f64::EPSILON);
        assert!((signal.weight_data_sufficiency - 0.3).abs() < f64::EPSILON);
        assert!((signal.weight_signal_consistency - 0.3).abs() < f64::EPSILON);
        assert_eq!(signal.velocity_windows_minutes, vec![5, 60, 1440]);
    }

    #[test]
    fn config_roundtrips_through_serde() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.quota.youtube, config.quota.youtube);
        assert_eq!(back.signal.zscore_lookback, config.signal.zscore_lookback);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let json = r#"{"server": {"host": "127.0.0.1", "port": 9000}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.quota.telegram, 200);
    }
}
