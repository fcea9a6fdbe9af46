//! Daily market bar data model.

use chrono::{DateTime, Utc};
use crowd_pulse_core::{DataMode, MarketBar};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row per `(symbol, date, mode)`; upserted if re-fetched.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarketDataRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub id: Option<i64>,
    pub symbol: String,
    pub date: DateTime<Utc>,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub volume: Option<i64>,
    /// Shares actually transferred (settled), the participation proxy.
    pub delivery_volume: Option<i64>,
    /// Delivery volume as a percentage of total traded volume.
    pub delivery_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub fetched_at: Option<DateTime<Utc>>,
    pub data_mode: String,
}

impl MarketDataRecord {
    /// Builds a record from an adapter bar for the given mode.
    #[must_use]
    pub fn from_bar(bar: &MarketBar, mode: DataMode) -> Self {
        Self {
            id: None,
            symbol: bar.symbol.clone(),
            date: bar.date,
            open: Some(bar.open),
            high: Some(bar.high),
            low: Some(bar.low),
            close: Some(bar.close),
            volume: Some(bar.volume),
            delivery_volume: bar.delivery_volume,
            delivery_pct: bar.delivery_pct,
            fetched_at: None,
            data_mode: mode.as_str().to_string(),
        }
    }
}
