//! Per-symbol signal assembly.
//!
//! Pulls together one computation cycle for one symbol: velocity from the
//! scored records, divergence from day-aligned discussion and delivery
//! volumes, and the confidence blend. Pure over its inputs, so symbols can
//! be computed in parallel without shared state.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use crowd_pulse_core::{DataMode, SignalConfig};
use crowd_pulse_data::{MarketDataRecord, SentimentRecordRow, SignalRecord};

use crate::confidence::{
    compute_confidence, data_sufficiency, model_certainty, signal_consistency, ConfidenceWeights,
};
use crate::divergence::{classify_divergence, compute_divergence, DivergenceConfig};
use crate::velocity::{compute_velocity, SentimentObservation, VelocityConfig};

/// Minimum scored records before a signal row is produced at all.
const MIN_SENTIMENT_ROWS: usize = 2;

/// Assembles the signal row for one symbol and bucket.
///
/// Returns `None` when there are too few scored records to say anything —
/// thin data yields no row rather than a spurious one.
#[must_use]
pub fn assemble_signal(
    symbol: &str,
    bucket: DateTime<Utc>,
    sentiment: &[SentimentRecordRow],
    market: &[MarketDataRecord],
    recent_divergence: &[f64],
    config: &SignalConfig,
    mode: DataMode,
) -> Option<SignalRecord> {
    // The bucket's own statistics cover the configured trailing hours;
    // older rows still feed velocity windows and the daily alignment.
    let window_start = bucket - Duration::hours(config.lookback_hours);
    let recent: Vec<&SentimentRecordRow> = sentiment
        .iter()
        .filter(|r| r.scored_at >= window_start && r.scored_at <= bucket)
        .collect();
    if recent.len() < MIN_SENTIMENT_ROWS {
        return None;
    }

    let total_count = recent.len();
    let avg_sentiment = recent
        .iter()
        .map(|r| r.signed_score(config.weight_by_probability))
        .sum::<f64>()
        / total_count as f64;

    // Velocity over the rolling windows ending at the bucket
    let observations: Vec<SentimentObservation> = sentiment
        .iter()
        .map(|r| SentimentObservation {
            at: r.scored_at,
            score: r.signed_score(config.weight_by_probability),
        })
        .collect();
    let velocity_config = VelocityConfig {
        windows_minutes: config.velocity_windows_minutes.clone(),
        min_records: config.velocity_min_records,
    };
    let velocity = compute_velocity(&observations, bucket, &velocity_config);

    // Divergence over day-aligned discussion vs delivery volumes
    let divergence_config = DivergenceConfig {
        hype_threshold: config.hype_threshold,
        panic_threshold: config.panic_threshold,
        lookback: config.zscore_lookback,
    };
    let (discussion_daily, delivery_daily) = align_daily(sentiment, market);
    let divergence_score =
        compute_divergence(&discussion_daily, &delivery_daily, config.zscore_lookback);
    let direction = classify_divergence(divergence_score, &divergence_config);

    // Confidence blend
    let probabilities: Vec<f64> = recent.iter().map(|r| r.score).collect();
    let weights = ConfidenceWeights {
        model_certainty: config.weight_model_certainty,
        data_sufficiency: config.weight_data_sufficiency,
        signal_consistency: config.weight_signal_consistency,
    };
    let mc = model_certainty(&probabilities);
    let ds = data_sufficiency(total_count, config.target_record_count);
    let sc = signal_consistency(recent_divergence, config.consistency_variance_scale);
    let confidence = compute_confidence(mc, ds, sc, &weights);

    tracing::debug!(
        "{}: divergence {:.3} ({}), velocity {:.1}, confidence {:.3}",
        symbol,
        divergence_score,
        direction.as_str(),
        velocity.velocity,
        confidence
    );

    Some(SignalRecord {
        id: None,
        symbol: symbol.to_string(),
        bucket,
        sentiment_score_avg: Some(avg_sentiment),
        discussion_volume: Some(total_count as i32),
        sentiment_velocity: Some(velocity.velocity),
        velocity_window_minutes: velocity.window_minutes.map(|w| w as i32),
        divergence_score: Some(divergence_score),
        divergence_direction: Some(direction.as_str().to_string()),
        confidence_score: Some(confidence),
        model_certainty: Some(mc),
        data_sufficiency: Some(ds),
        signal_consistency: Some(sc),
        computed_at: Utc::now(),
        data_mode: mode.as_str().to_string(),
    })
}

/// Aggregates discussion counts and delivery volumes per calendar day and
/// keeps only days present in both series, oldest first.
fn align_daily(
    sentiment: &[SentimentRecordRow],
    market: &[MarketDataRecord],
) -> (Vec<f64>, Vec<f64>) {
    let mut discussion: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in sentiment {
        *discussion.entry(record.scored_at.date_naive()).or_insert(0.0) += 1.0;
    }

    let mut delivery: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in market {
        if let Some(volume) = record.delivery_volume {
            *delivery.entry(record.date.date_naive()).or_insert(0.0) += volume as f64;
        }
    }

    let mut discussion_aligned = Vec::new();
    let mut delivery_aligned = Vec::new();
    for (day, count) in &discussion {
        if let Some(volume) = delivery.get(day) {
            discussion_aligned.push(*count);
            delivery_aligned.push(*volume);
        }
    }

    (discussion_aligned, delivery_aligned)
}
