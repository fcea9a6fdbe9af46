//! Divergence between discussion volume and delivery volume.
//!
//! Both series are normalised independently with a rolling z-score over a
//! trailing lookback, then differenced. Positive divergence means chatter
//! is outpacing real participation.

use crowd_pulse_data::DivergenceDirection;
use serde::{Deserialize, Serialize};

/// Configuration for divergence computation and classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceConfig {
    /// Score at or above which direction is "hype".
    pub hype_threshold: f64,
    /// Score at or below which direction is "panic".
    pub panic_threshold: f64,
    /// Trailing buckets per rolling z-score window.
    pub lookback: usize,
}

impl Default for DivergenceConfig {
    fn default() -> Self {
        Self {
            hype_threshold: 1.5,
            panic_threshold: -1.5,
            lookback: 14,
        }
    }
}

/// Rolling z-score of each point over the trailing `lookback` points
/// (window ends at and includes the point).
///
/// A window with fewer than 2 points or zero standard deviation yields 0
/// for that point, so thin or flat history never produces a spurious spike.
#[must_use]
pub fn rolling_zscore(series: &[f64], lookback: usize) -> Vec<f64> {
    series
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let start = (i + 1).saturating_sub(lookback.max(2));
            zscore(&series[start..=i], x)
        })
        .collect()
}

/// z-score of `current` against the window's sample statistics;
/// 0 when the standard deviation is zero or undefined.
fn zscore(window: &[f64], current: f64) -> f64 {
    if window.len() < 2 {
        return 0.0;
    }
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > f64::EPSILON && stddev.is_finite() {
        (current - mean) / stddev
    } else {
        0.0
    }
}

/// Divergence series: `z(discussion) − z(delivery)` pointwise.
///
/// The series are truncated to their common length from the end.
#[must_use]
pub fn divergence_series(discussion: &[f64], delivery: &[f64], lookback: usize) -> Vec<f64> {
    let len = discussion.len().min(delivery.len());
    let discussion_z = rolling_zscore(&discussion[discussion.len() - len..], lookback);
    let delivery_z = rolling_zscore(&delivery[delivery.len() - len..], lookback);

    discussion_z
        .iter()
        .zip(delivery_z.iter())
        .map(|(d, v)| d - v)
        .collect()
}

/// Divergence score at the latest aligned point; 0 below 2 common points.
#[must_use]
pub fn compute_divergence(discussion: &[f64], delivery: &[f64], lookback: usize) -> f64 {
    let series = divergence_series(discussion, delivery, lookback);
    if series.len() < 2 {
        return 0.0;
    }
    *series.last().unwrap_or(&0.0)
}

/// Classifies a divergence score against the configured thresholds.
#[must_use]
pub fn classify_divergence(score: f64, config: &DivergenceConfig) -> DivergenceDirection {
    if score >= config.hype_threshold {
        DivergenceDirection::Hype
    } else if score <= config.panic_threshold {
        DivergenceDirection::Panic
    } else {
        DivergenceDirection::Neutral
    }
}
