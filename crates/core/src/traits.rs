//! Capability seams the pipeline is composed from.
//!
//! The orchestrator treats every external platform as a uniform producer of
//! raw records, and the sentiment model as a uniform scoring function. The
//! concrete scraping logic behind each platform stays outside the core.

use crate::sentiment::SentimentLabel;
use crate::service::Service;
use crate::window::TimeWindow;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw text record produced by a discussion source, before scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPost {
    pub source: Service,
    /// Target symbol, if the source already attributes one.
    pub symbol: Option<String>,
    pub raw_text: String,
    pub author: Option<String>,
    /// Source-native identifier; `(source, source_id)` is the dedup key.
    pub source_id: String,
    pub posted_at: DateTime<Utc>,
}

/// One daily market bar with delivery (settled) volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketBar {
    pub symbol: String,
    pub date: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
    pub delivery_volume: Option<i64>,
    /// Delivery volume as a percentage of total traded volume.
    pub delivery_pct: Option<f64>,
}

/// Classification result for one text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub label: SentimentLabel,
    /// Classification probability in [0, 1].
    pub probability: f64,
}

/// A platform that yields raw discussion records for a time window.
#[async_trait]
pub trait DiscussionSource: Send + Sync {
    /// The quota service this source draws on.
    fn service(&self) -> Service;

    /// Fetches at most `budget` records posted inside `window`.
    ///
    /// # Errors
    /// Returns error on transport or upstream failure; the orchestrator
    /// records the failure and continues with the next step.
    async fn fetch(&self, window: &TimeWindow, budget: u32) -> Result<Vec<RawPost>>;
}

/// A provider of daily OHLCV + delivery volume bars.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches bars for the given symbols covering `window`.
    ///
    /// # Errors
    /// Returns error on transport or upstream failure.
    async fn fetch(&self, symbols: &[String], window: &TimeWindow) -> Result<Vec<MarketBar>>;
}

/// A sentiment classifier: text in, `(label, probability)` out.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    /// Scores a batch of normalised texts, one outcome per input.
    ///
    /// # Errors
    /// Returns error only on whole-batch failure; individual degenerate
    /// texts score neutral rather than failing the batch.
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<ScoreOutcome>>;

    /// Identifier recorded with every scored row, e.g. `"lexicon-v1"`.
    fn model_id(&self) -> &str;
}
