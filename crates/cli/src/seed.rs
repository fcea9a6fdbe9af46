//! Sample-data seeding for test mode.
//!
//! Writes a realistic spread of social posts and market bars carrying the
//! test mode flag, so the scoring and signal phases can be exercised
//! without live credentials. Each symbol gets a stable sentiment profile
//! derived from its name, so reseeded data keeps its character.

use anyhow::Result;
use chrono::{Duration, Utc};
use crowd_pulse_core::{symbols::default_symbols, DataMode};
use crowd_pulse_data::{MarketDataRecord, MarketRepository, PostRepository, SocialPostRecord};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;

const POSITIVE_COMMENTS: &[&str] = &[
    "looking very strong, accumulate on dips",
    "breakout confirmed, this can be a multibagger",
    "mast stock hai, zabardast quarterly numbers",
    "rocket mode on, buy before it moons",
    "hidden gem, great opportunity at these levels",
];

const NEGATIVE_COMMENTS: &[&str] = &[
    "total trap, exit before the crash",
    "overvalued bubble, stop loss hit already",
    "yeh stock doobega, avoid at all costs",
    "promoters dumping, risky to hold",
    "dead money, better to sell and move on",
];

const NEUTRAL_COMMENTS: &[&str] = &[
    "results due next week, waiting for numbers",
    "rangebound for months, nothing to see",
    "volume is average, no clear direction",
    "holding since last year, no change in view",
];

const SEED_SOURCES: &[&str] = &["telegram", "youtube", "twitter"];

/// Stable (positive, negative) probability profile for a symbol.
fn symbol_profile(symbol: &str) -> (f64, f64) {
    let hash: u32 = symbol.bytes().map(u32::from).sum();
    let positive = 0.25 + f64::from(hash % 40) / 100.0;
    let negative = 0.10 + f64::from((hash / 7) % 30) / 100.0;
    (positive, negative)
}

/// Seeds sample posts and market bars over the trailing `hours`.
///
/// Idempotent per calendar day: the synthetic source ids embed the date,
/// so reseeding the same day inserts nothing new.
///
/// # Errors
/// Returns an error if a database write fails.
pub async fn seed_sample_data(pool: &PgPool, hours: i64, mode: DataMode) -> Result<()> {
    let posts_repo = PostRepository::new(pool.clone());
    let market_repo = MarketRepository::new(pool.clone());
    let symbols = default_symbols();
    let now = Utc::now();
    let day_tag = now.format("%Y%m%d");
    let mut rng = rand::thread_rng();

    let mut posts = Vec::new();
    for symbol in &symbols {
        let (positive, negative) = symbol_profile(symbol);
        let post_count = rng.gen_range(3..=9);
        for i in 0..post_count {
            let roll: f64 = rng.gen();
            let comment = if roll < positive {
                POSITIVE_COMMENTS[rng.gen_range(0..POSITIVE_COMMENTS.len())]
            } else if roll < positive + negative {
                NEGATIVE_COMMENTS[rng.gen_range(0..NEGATIVE_COMMENTS.len())]
            } else {
                NEUTRAL_COMMENTS[rng.gen_range(0..NEUTRAL_COMMENTS.len())]
            };
            let source = SEED_SOURCES[rng.gen_range(0..SEED_SOURCES.len())];
            let minutes_ago = rng.gen_range(0..hours.max(1) * 60);
            let posted_at = now - Duration::minutes(minutes_ago);

            posts.push(SocialPostRecord {
                id: None,
                source: source.to_string(),
                symbol: Some(symbol.clone()),
                raw_text: format!("{symbol} - {comment}"),
                cleaned_text: None,
                author: Some(format!("{source}_user_{}", rng.gen_range(1..=100))),
                source_id: format!("seed_{source}_{symbol}_{day_tag}_{i}"),
                posted_at: Some(posted_at),
                ingested_at: None,
                data_mode: mode.as_str().to_string(),
            });
        }
    }
    let inserted = posts_repo.insert_batch(&posts).await?;
    tracing::info!("Seeded {} posts ({} generated)", inserted, posts.len());

    let mut bars = Vec::new();
    for symbol in &symbols {
        let base = rng.gen_range(200.0..3000.0_f64);
        for day in 0..7i64 {
            let drift: f64 = rng.gen_range(-0.03..0.03);
            let open = base * (1.0 + rng.gen_range(-0.01..0.01));
            let close = base * (1.0 + drift);
            let high = open.max(close) * 1.01;
            let low = open.min(close) * 0.99;
            let volume = rng.gen_range(500_000..20_000_000i64);
            let delivery_pct = rng.gen_range(35.0..65.0_f64);
            let delivery_volume = (volume as f64 * delivery_pct / 100.0) as i64;
            let date = (now - Duration::days(day))
                .date_naive()
                .and_hms_opt(15, 30, 0)
                .unwrap_or_default()
                .and_utc();

            bars.push(MarketDataRecord {
                id: None,
                symbol: symbol.clone(),
                date,
                open: to_decimal(open),
                high: to_decimal(high),
                low: to_decimal(low),
                close: to_decimal(close),
                volume: Some(volume),
                delivery_volume: Some(delivery_volume),
                delivery_pct: Some((delivery_pct * 100.0).round() / 100.0),
                fetched_at: None,
                data_mode: mode.as_str().to_string(),
            });
        }
    }
    let written = market_repo.upsert_batch(&bars).await?;
    tracing::info!("Seeded {} market bars", written);

    Ok(())
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::try_from((value * 100.0).round() / 100.0).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_are_stable_and_bounded() {
        let (p1, n1) = symbol_profile("RELIANCE");
        let (p2, n2) = symbol_profile("RELIANCE");
        assert!((p1 - p2).abs() < f64::EPSILON);
        assert!((n1 - n2).abs() < f64::EPSILON);
        assert!(p1 + n1 < 1.0);
        assert!(p1 > 0.0 && n1 > 0.0);
    }

    #[test]
    fn profiles_differ_across_symbols() {
        let a = symbol_profile("RELIANCE");
        let b = symbol_profile("ITC");
        assert!(a != b);
    }

    #[test]
    fn seed_comments_match_lexicon_polarity() {
        use crowd_pulse_core::SentimentLabel;
        use crowd_pulse_sources::LexiconScorer;

        let scorer = LexiconScorer::new();
        for comment in POSITIVE_COMMENTS {
            assert_eq!(scorer.score_text(comment).label, SentimentLabel::Positive, "{comment}");
        }
        for comment in NEGATIVE_COMMENTS {
            assert_eq!(scorer.score_text(comment).label, SentimentLabel::Negative, "{comment}");
        }
        for comment in NEUTRAL_COMMENTS {
            assert_eq!(scorer.score_text(comment).label, SentimentLabel::Neutral, "{comment}");
        }
    }

    #[test]
    fn to_decimal_rounds_to_paise() {
        let d = to_decimal(1234.5678).unwrap();
        assert_eq!(d.to_string(), "1234.57");
    }
}
