//! Generic JSON discussion-feed adapter.
//!
//! The per-platform scraping specifics live outside this crate; each
//! discussion service is reached through a JSON feed endpoint that serves
//! recent posts. One `FeedSource` instance is configured per service.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowd_pulse_core::{DiscussionSource, RawPost, Service, TimeWindow};
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;

/// Default outbound pacing (requests per second). Politeness only; the
/// daily budget is enforced by the quota ledger, not here.
const DEFAULT_RATE_LIMIT_PER_SECOND: u32 = 5;

/// Configuration for a feed-backed discussion source.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// The quota service this feed draws on.
    pub service: Service,
    /// Feed endpoint serving posts as JSON.
    pub base_url: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Requests per second towards the feed.
    pub requests_per_second: u32,
}

impl FeedConfig {
    #[must_use]
    pub fn new(service: Service, base_url: impl Into<String>) -> Self {
        Self {
            service,
            base_url: base_url.into(),
            api_key: None,
            requests_per_second: DEFAULT_RATE_LIMIT_PER_SECOND,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// Discussion source backed by a JSON feed endpoint.
pub struct FeedSource {
    config: FeedConfig,
    http: reqwest::Client,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl FeedSource {
    #[must_use]
    pub fn new(config: FeedConfig) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second.max(1))
            .unwrap_or(NonZeroU32::MIN);
        Self {
            config,
            http: reqwest::Client::new(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    fn build_url(&self, window: &TimeWindow, budget: u32) -> String {
        format!(
            "{}?since={}&until={}&limit={}",
            self.config.base_url,
            window.since.to_rfc3339(),
            window.until.to_rfc3339(),
            budget
        )
    }

    /// Converts one feed item, dropping entries with unparseable
    /// timestamps or timestamps outside the window.
    fn convert(&self, item: &FeedItem, window: &TimeWindow) -> Option<RawPost> {
        let posted_at = DateTime::parse_from_rfc3339(&item.posted_at)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()?;
        if !window.contains(posted_at) {
            return None;
        }
        if item.text.trim().is_empty() {
            return None;
        }

        Some(RawPost {
            source: self.config.service,
            symbol: item.symbol.clone(),
            raw_text: item.text.clone(),
            author: item.author.clone(),
            source_id: item.id.clone(),
            posted_at,
        })
    }
}

#[async_trait]
impl DiscussionSource for FeedSource {
    fn service(&self) -> Service {
        self.config.service
    }

    async fn fetch(&self, window: &TimeWindow, budget: u32) -> Result<Vec<RawPost>> {
        self.rate_limiter.until_ready().await;

        let url = self.build_url(window, budget);
        tracing::debug!("Fetching {} feed: {}", self.config.service, url);

        let mut request = self.http.get(&url).header("Accept", "application/json");
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} feed error {}: {}", self.config.service, status, text));
        }

        let feed: FeedResponse = response.json().await?;
        let posts: Vec<RawPost> = feed
            .items
            .unwrap_or_default()
            .iter()
            .filter_map(|item| self.convert(item, window))
            .take(budget as usize)
            .collect();

        tracing::info!(
            "{} feed returned {} posts in window",
            self.config.service,
            posts.len()
        );
        Ok(posts)
    }
}

// ========== Feed response types ==========

#[derive(Debug, Deserialize)]
struct FeedResponse {
    items: Option<Vec<FeedItem>>,
}

#[derive(Debug, Clone, Deserialize)]
struct FeedItem {
    /// Source-native identifier, the dedup key
    id: String,
    text: String,
    author: Option<String>,
    symbol: Option<String>,
    /// RFC 3339 timestamp
    posted_at: String,
}
