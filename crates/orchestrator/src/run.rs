//! Run state: `PENDING → RUNNING → {DONE, ERROR}`.
//!
//! Each phase's successful side effects are retained even if a later phase
//! fails — there is no rollback, and no phase re-entry.

use chrono::{DateTime, Utc};
use crowd_pulse_core::{DataMode, RunStatus, StepOutcome, TimeWindow};
use serde::{Deserialize, Serialize};

/// Ledger of a single orchestration attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub started_at: DateTime<Utc>,
    pub window: TimeWindow,
    pub mode: DataMode,
    pub steps: Vec<StepOutcome>,
    pub status: RunStatus,
    pub finished_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    #[must_use]
    pub fn start(window: TimeWindow, mode: DataMode) -> Self {
        Self {
            started_at: Utc::now(),
            window,
            mode,
            steps: Vec::new(),
            status: RunStatus::Running,
            finished_at: None,
        }
    }

    /// Appends a step outcome. Steps arrive in execution order and are
    /// never revisited.
    pub fn record_step(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }

    /// Seals the run: `Error` only when every step failed, otherwise
    /// `Done` — partial failure is an expected outcome, not an error.
    pub fn finalize(&mut self) {
        let all_failed =
            !self.steps.is_empty() && self.steps.iter().all(|s| s.status.is_failure());
        self.status = if all_failed { RunStatus::Error } else { RunStatus::Done };
        self.finished_at = Some(Utc::now());
    }

    /// Count of steps that stored records.
    #[must_use]
    pub fn completed_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, crowd_pulse_core::StepStatus::Completed))
            .count()
    }

    /// Count of failed steps.
    #[must_use]
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.status.is_failure()).count()
    }

    /// One-line summary for the terminal progress event.
    #[must_use]
    pub fn summary(&self) -> String {
        let records: u64 = self.steps.iter().map(|s| s.records).sum();
        let skipped = self.steps.len() - self.completed_steps() - self.failed_steps();
        format!(
            "{} steps: {} completed, {} skipped, {} failed, {} records",
            self.steps.len(),
            self.completed_steps(),
            skipped,
            self.failed_steps(),
            records
        )
    }
}
