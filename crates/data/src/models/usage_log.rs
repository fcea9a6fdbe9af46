//! API usage audit log data model.
//!
//! Append-only: one row per quota check/outcome pair, never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UsageLogRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub id: Option<i64>,
    pub service: String,
    pub endpoint: Option<String>,
    /// "success", "blocked", or "error"
    pub status: String,
    pub response_time_ms: Option<f64>,
    pub records_fetched: i32,
    pub error_message: Option<String>,
    /// Daily counter value after this call
    pub daily_count: Option<i32>,
    pub daily_limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub called_at: Option<DateTime<Utc>>,
}

impl UsageLogRecord {
    #[must_use]
    pub fn new(service: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: None,
            service: service.into(),
            endpoint: None,
            status: status.into(),
            response_time_ms: None,
            records_fetched: 0,
            error_message: None,
            daily_count: None,
            daily_limit: None,
            called_at: None,
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_latency_ms(mut self, ms: f64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn with_records(mut self, records: i32) -> Self {
        self.records_fetched = records;
        self
    }

    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_daily(mut self, count: u32, limit: u32) -> Self {
        self.daily_count = Some(count as i32);
        self.daily_limit = Some(limit as i32);
        self
    }
}
