//! Sentiment velocity across rolling time windows.
//!
//! For each window the mean signed sentiment over `[as_of - w, as_of)` is
//! compared against the immediately preceding window of equal length. The
//! absolute difference is scaled so that a full swing from −1 to +1 inside
//! one window reads as 100. The reported value is the maximum across
//! windows — rapid short-term shifts dominate slow long-term drift.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A mean-sentiment swing mapping to velocity 100: −1 → +1.
const FULL_SWING: f64 = 2.0;

/// Velocity reported when no window has enough data. Reserved strictly for
/// the insufficient-data case; unchanged sentiment reads as 0, not 50.
pub const BASELINE_VELOCITY: f64 = 50.0;

/// Configuration for velocity computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VelocityConfig {
    /// Window sizes in minutes, shortest first.
    pub windows_minutes: Vec<i64>,
    /// Minimum observations required in both sub-windows of a window.
    pub min_records: usize,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            windows_minutes: vec![5, 60, 1440],
            min_records: 5,
        }
    }
}

/// One signed sentiment observation.
#[derive(Debug, Clone, Copy)]
pub struct SentimentObservation {
    pub at: DateTime<Utc>,
    /// Signed score in [−1, 1]: label sign, optionally probability-weighted.
    pub score: f64,
}

/// Outcome of a velocity computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityResult {
    /// Velocity in [0, 100].
    pub velocity: f64,
    /// The window that produced the reported value, if any qualified.
    pub window_minutes: Option<i64>,
    /// True when every window fell below the record minimum.
    pub insufficient: bool,
}

impl VelocityResult {
    #[must_use]
    const fn baseline() -> Self {
        Self {
            velocity: BASELINE_VELOCITY,
            window_minutes: None,
            insufficient: true,
        }
    }
}

/// Computes sentiment velocity for a symbol as of `as_of`.
///
/// Observations outside `[as_of - 2w, as_of)` for the largest window are
/// ignored, so callers only need to supply a bounded trailing history.
#[must_use]
pub fn compute_velocity(
    observations: &[SentimentObservation],
    as_of: DateTime<Utc>,
    config: &VelocityConfig,
) -> VelocityResult {
    let mut best: Option<(f64, i64)> = None;

    for &window_minutes in &config.windows_minutes {
        if window_minutes <= 0 {
            continue;
        }
        let window = Duration::minutes(window_minutes);
        let current = window_mean(observations, as_of - window, as_of);
        let previous = window_mean(observations, as_of - window - window, as_of - window);

        let (Some((current_mean, current_n)), Some((previous_mean, previous_n))) =
            (current, previous)
        else {
            continue;
        };

        if current_n < config.min_records || previous_n < config.min_records {
            continue;
        }

        let velocity = ((current_mean - previous_mean).abs() / FULL_SWING * 100.0).min(100.0);
        match best {
            Some((v, _)) if v >= velocity => {}
            _ => best = Some((velocity, window_minutes)),
        }
    }

    match best {
        Some((velocity, window_minutes)) => VelocityResult {
            velocity,
            window_minutes: Some(window_minutes),
            insufficient: false,
        },
        None => VelocityResult::baseline(),
    }
}

/// Mean score over `[start, end)`, with the observation count.
fn window_mean(
    observations: &[SentimentObservation],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<(f64, usize)> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for obs in observations {
        if obs.at >= start && obs.at < end {
            sum += obs.score;
            n += 1;
        }
    }
    if n == 0 {
        None
    } else {
        Some((sum / n as f64, n))
    }
}
