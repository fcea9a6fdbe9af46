//! Progress reporting and run outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One discrete progress update pushed to the run's event stream.
///
/// `progress` is monotonically non-decreasing across a run and reaches 100
/// only on the terminal event (`done: true`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: String,
    pub message: String,
    pub progress: u8,
    pub done: bool,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    #[must_use]
    pub fn new(step: impl Into<String>, message: impl Into<String>, progress: u8) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
            progress: progress.min(100),
            done: false,
            timestamp: Utc::now(),
        }
    }

    /// Marks this event as the terminal one.
    #[must_use]
    pub fn terminal(mut self) -> Self {
        self.done = true;
        self
    }
}

/// Outcome of a single pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepStatus {
    /// Step ran and stored its records.
    Completed,
    /// Step did not run (quota exhausted, not configured, or test mode).
    Skipped { reason: String },
    /// Step raised; the run continued to the next step.
    Failed { error: String },
}

impl StepStatus {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed { .. })
    }
}

/// Ledger entry for one executed (or skipped) pipeline step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: String,
    #[serde(flatten)]
    pub status: StepStatus,
    pub records: u64,
    pub message: String,
}

impl StepOutcome {
    #[must_use]
    pub fn completed(step: impl Into<String>, records: u64, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Completed,
            records,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn skipped(step: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            step: step.into(),
            status: StepStatus::Skipped { reason: reason.clone() },
            records: 0,
            message: reason,
        }
    }

    #[must_use]
    pub fn failed(step: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            step: step.into(),
            status: StepStatus::Failed { error: error.clone() },
            records: 0,
            message: error,
        }
    }
}

/// Overall state of a pipeline run: `Running → Done | Error`.
///
/// `Error` is reached only when every step failed; partial failures still
/// finish as `Done` with the failed steps recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Done,
    Error,
}

impl RunStatus {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_event_caps_at_100() {
        let event = ProgressEvent::new("signals", "done", 250);
        assert_eq!(event.progress, 100);
        assert!(!event.done);
        assert!(event.terminal().done);
    }

    #[test]
    fn step_outcome_constructors_carry_status() {
        let ok = StepOutcome::completed("telegram", 12, "12 messages");
        assert_eq!(ok.status, StepStatus::Completed);
        assert_eq!(ok.records, 12);

        let skipped = StepOutcome::skipped("twitter", "quota exceeded");
        assert!(matches!(skipped.status, StepStatus::Skipped { .. }));
        assert!(!skipped.status.is_failure());

        let failed = StepOutcome::failed("market", "timed out");
        assert!(failed.status.is_failure());
        assert_eq!(failed.message, "timed out");
    }

    #[test]
    fn run_status_terminality() {
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Done.is_terminal());
        assert!(RunStatus::Error.is_terminal());
    }

    #[test]
    fn progress_event_serializes_expected_shape() {
        let event = ProgressEvent::new("scoring", "Scored 40 posts", 80).terminal();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"step\":\"scoring\""));
        assert!(json.contains("\"progress\":80"));
        assert!(json.contains("\"done\":true"));
    }
}
