//! Daily market-data adapter with delivery-volume estimation.
//!
//! Fetches daily OHLCV bars per symbol from a JSON endpoint. When the feed
//! reports no delivery numbers, the delivery percentage is estimated from
//! the intraday range: a wider range relative to close means more
//! speculative flow and less delivery.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowd_pulse_core::{MarketBar, MarketDataSource, TimeWindow};
use governor::{Quota, RateLimiter};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::num::NonZeroU32;

/// Default outbound pacing (requests per second).
const DEFAULT_RATE_LIMIT_PER_SECOND: u32 = 5;

/// Configuration for the market feed adapter.
#[derive(Debug, Clone)]
pub struct MarketFeedConfig {
    /// Endpoint serving daily bars as JSON.
    pub base_url: String,
    pub requests_per_second: u32,
}

impl MarketFeedConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            requests_per_second: DEFAULT_RATE_LIMIT_PER_SECOND,
        }
    }
}

pub struct MarketFeedSource {
    config: MarketFeedConfig,
    http: reqwest::Client,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl MarketFeedSource {
    #[must_use]
    pub fn new(config: MarketFeedConfig) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second.max(1))
            .unwrap_or(NonZeroU32::MIN);
        Self {
            config,
            http: reqwest::Client::new(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    async fn fetch_symbol(&self, symbol: &str, window: &TimeWindow) -> Result<Vec<MarketBar>> {
        self.rate_limiter.until_ready().await;

        let url = format!(
            "{}?symbol={}&start={}&end={}",
            self.config.base_url,
            symbol,
            window.since.to_rfc3339(),
            window.until.to_rfc3339()
        );

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow!("market feed error {} for {}", status, symbol));
        }

        let payload: BarsResponse = response.json().await?;
        let mut bars = Vec::new();
        for dto in payload.bars.unwrap_or_default() {
            match convert_bar(symbol, &dto) {
                Ok(bar) => bars.push(bar),
                Err(e) => tracing::warn!("Skipping malformed bar for {}: {}", symbol, e),
            }
        }
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataSource for MarketFeedSource {
    async fn fetch(&self, symbols: &[String], window: &TimeWindow) -> Result<Vec<MarketBar>> {
        let mut all = Vec::new();
        let mut failures = 0usize;

        for symbol in symbols {
            match self.fetch_symbol(symbol, window).await {
                Ok(bars) => {
                    tracing::debug!("Fetched {} bars for {}", bars.len(), symbol);
                    all.extend(bars);
                }
                Err(e) => {
                    tracing::error!("Market fetch failed for {}: {}", symbol, e);
                    failures += 1;
                }
            }
        }

        if !symbols.is_empty() && failures == symbols.len() {
            return Err(anyhow!("market feed failed for all {} symbols", symbols.len()));
        }
        Ok(all)
    }
}

fn convert_bar(symbol: &str, dto: &BarDto) -> Result<MarketBar> {
    let date = DateTime::parse_from_rfc3339(&dto.date)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("bad bar date {:?}", dto.date))?;

    let open = decimal(dto.open, "open")?;
    let high = decimal(dto.high, "high")?;
    let low = decimal(dto.low, "low")?;
    let close = decimal(dto.close, "close")?;

    let (delivery_volume, delivery_pct) = match (dto.delivery_volume, dto.delivery_pct) {
        (Some(volume), pct) => {
            let pct = pct.or_else(|| {
                if dto.volume > 0 {
                    Some(volume as f64 / dto.volume as f64 * 100.0)
                } else {
                    None
                }
            });
            (Some(volume), pct)
        }
        (None, _) => {
            let pct = estimate_delivery_pct(dto.high, dto.low, dto.close);
            let volume = if dto.volume > 0 {
                Some((dto.volume as f64 * pct) as i64)
            } else {
                None
            };
            (volume, Some((pct * 10_000.0).round() / 100.0))
        }
    };

    Ok(MarketBar {
        symbol: symbol.to_string(),
        date,
        open,
        high,
        low,
        close,
        volume: dto.volume,
        delivery_volume,
        delivery_pct,
    })
}

fn decimal(value: f64, field: &str) -> Result<Decimal> {
    Decimal::try_from(value).with_context(|| format!("non-finite {field} value {value}"))
}

/// Estimates delivery percentage from the intraday price range.
///
/// Liquid large-caps typically see 35–65% delivery. Mapping: 0% intraday
/// range → ~60% delivery, 5%+ range → ~35%, linear in between and clamped.
#[must_use]
pub fn estimate_delivery_pct(high: f64, low: f64, close: f64) -> f64 {
    if close <= 0.0 {
        return 0.50;
    }
    let intraday_range_pct = (high - low) / close;
    (0.60 - intraday_range_pct * 5.0).clamp(0.35, 0.65)
}

// ========== Market feed response types ==========

#[derive(Debug, Deserialize)]
struct BarsResponse {
    bars: Option<Vec<BarDto>>,
}

#[derive(Debug, Clone, Deserialize)]
struct BarDto {
    /// RFC 3339 timestamp of the trading day
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
    delivery_volume: Option<i64>,
    delivery_pct: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(volume: i64, delivery_volume: Option<i64>) -> BarDto {
        BarDto {
            date: "2026-02-06T15:30:00Z".to_string(),
            open: 1000.0,
            high: 1010.0,
            low: 995.0,
            close: 1005.0,
            volume,
            delivery_volume,
            delivery_pct: None,
        }
    }

    // ============================================
    // Delivery estimation heuristic
    // ============================================

    #[test]
    fn flat_day_estimates_high_delivery() {
        let pct = estimate_delivery_pct(100.0, 100.0, 100.0);
        assert!((pct - 0.60).abs() < 1e-9);
    }

    #[test]
    fn volatile_day_estimates_low_delivery() {
        // 10% intraday range clamps at the floor
        let pct = estimate_delivery_pct(110.0, 100.0, 100.0);
        assert!((pct - 0.35).abs() < 1e-9);
    }

    #[test]
    fn moderate_range_interpolates() {
        // 2% range → 0.60 - 0.10 = 0.50
        let pct = estimate_delivery_pct(102.0, 100.0, 100.0);
        assert!((pct - 0.50).abs() < 1e-9);
    }

    #[test]
    fn degenerate_close_defaults_to_midpoint() {
        assert!((estimate_delivery_pct(10.0, 5.0, 0.0) - 0.50).abs() < f64::EPSILON);
    }

    // ============================================
    // Bar conversion
    // ============================================

    #[test]
    fn convert_uses_reported_delivery() {
        let bar = convert_bar("SBIN", &dto(10_000_000, Some(4_500_000))).unwrap();
        assert_eq!(bar.delivery_volume, Some(4_500_000));
        assert!((bar.delivery_pct.unwrap() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn convert_estimates_missing_delivery() {
        let bar = convert_bar("SBIN", &dto(10_000_000, None)).unwrap();
        let volume = bar.delivery_volume.unwrap();
        // ~1.49% range → pct near 0.525
        assert!(volume > 4_000_000 && volume < 6_500_000);
        let pct = bar.delivery_pct.unwrap();
        assert!(pct > 35.0 && pct < 65.0);
    }

    #[test]
    fn convert_rejects_bad_date() {
        let mut bad = dto(1000, None);
        bad.date = "last tuesday".to_string();
        assert!(convert_bar("SBIN", &bad).is_err());
    }

    #[test]
    fn convert_zero_volume_leaves_delivery_unknown() {
        let bar = convert_bar("SBIN", &dto(0, None)).unwrap();
        assert!(bar.delivery_volume.is_none());
    }

    #[test]
    fn bars_response_parses() {
        let json = r#"{"bars": [{
            "date": "2026-02-06T15:30:00Z",
            "open": 100.0, "high": 101.0, "low": 99.0, "close": 100.5,
            "volume": 500000
        }]}"#;
        let payload: BarsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(payload.bars.unwrap().len(), 1);
    }
}
