//! Ingestion time window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Half-open time range `[since, until)` an ingestion run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window ending now and reaching back `hours`.
    #[must_use]
    pub fn last_hours(hours: i64) -> Self {
        let until = Utc::now();
        Self {
            since: until - Duration::hours(hours),
            until,
        }
    }

    /// Creates an explicit window. `until` values before `since` are swapped.
    #[must_use]
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        if until < since {
            Self { since: until, until: since }
        } else {
            Self { since, until }
        }
    }

    /// Whether the timestamp falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.since && at < self.until
    }

    /// Window length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.until - self.since
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn last_hours_spans_requested_duration() {
        let window = TimeWindow::last_hours(24);
        assert_eq!(window.duration(), Duration::hours(24));
    }

    #[test]
    fn new_swaps_inverted_bounds() {
        let a = Utc.with_ymd_and_hms(2026, 2, 7, 12, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 2, 7, 18, 0, 0).unwrap();
        let window = TimeWindow::new(b, a);
        assert_eq!(window.since, a);
        assert_eq!(window.until, b);
    }

    #[test]
    fn contains_is_half_open() {
        let a = Utc.with_ymd_and_hms(2026, 2, 7, 12, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 2, 7, 18, 0, 0).unwrap();
        let window = TimeWindow::new(a, b);
        assert!(window.contains(a));
        assert!(!window.contains(b));
        assert!(window.contains(a + Duration::hours(3)));
    }
}
