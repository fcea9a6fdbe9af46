//! Confidence scoring: a weighted blend of model certainty, data
//! sufficiency, and signal consistency, each clamped to [0, 1] before
//! weighting so the result stays within [0, 1] for any input magnitude.

use serde::{Deserialize, Serialize};

/// Blend weights. The defaults are the historically used 0.4/0.3/0.3 and
/// are configuration, not validated constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub model_certainty: f64,
    pub data_sufficiency: f64,
    pub signal_consistency: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            model_certainty: 0.4,
            data_sufficiency: 0.3,
            signal_consistency: 0.3,
        }
    }
}

/// Weighted confidence score in [0, 1].
#[must_use]
pub fn compute_confidence(
    model_certainty: f64,
    data_sufficiency: f64,
    signal_consistency: f64,
    weights: &ConfidenceWeights,
) -> f64 {
    let score = weights.model_certainty * clamp_unit(model_certainty)
        + weights.data_sufficiency * clamp_unit(data_sufficiency)
        + weights.signal_consistency * clamp_unit(signal_consistency);
    clamp_unit(score)
}

/// Mean classification probability over a bucket; 0 with no records.
#[must_use]
pub fn model_certainty(probabilities: &[f64]) -> f64 {
    if probabilities.is_empty() {
        return 0.0;
    }
    let mean = probabilities.iter().sum::<f64>() / probabilities.len() as f64;
    clamp_unit(mean)
}

/// `min(1, count / target)`; 0 with no records, 1 when `target` is zero.
#[must_use]
pub fn data_sufficiency(record_count: usize, target_record_count: u32) -> f64 {
    if record_count == 0 {
        return 0.0;
    }
    if target_record_count == 0 {
        return 1.0;
    }
    (record_count as f64 / f64::from(target_record_count)).min(1.0)
}

/// `1 − variance / variance_scale` over recent divergence scores, clamped.
///
/// More erratic recent history means lower consistency. An empty history
/// scores 0 (no evidence of stability); a single point scores 1.
#[must_use]
pub fn signal_consistency(recent_divergence: &[f64], variance_scale: f64) -> f64 {
    if recent_divergence.is_empty() {
        return 0.0;
    }
    if variance_scale <= f64::EPSILON {
        return 0.0;
    }
    let n = recent_divergence.len() as f64;
    let mean = recent_divergence.iter().sum::<f64>() / n;
    let variance = recent_divergence.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    clamp_unit(1.0 - variance / variance_scale)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
