//! Pipeline error taxonomy.
//!
//! Only `Busy` ever reaches the caller of a run request. Quota and source
//! failures are caught per step and recorded in the run ledger; computation
//! failures abort the affected symbol's bucket and nothing else.

use crowd_pulse_core::Service;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A run is already in progress; the request was not accepted.
    #[error("a pipeline run is already in progress")]
    Busy,

    /// Expected and non-fatal: the step is skipped, the run continues.
    #[error("daily quota exceeded for {0}")]
    QuotaExceeded(Service),

    /// Adapter-level failure: the step is marked failed, the run continues.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// A scoring batch failed; unscored posts are retried next run.
    #[error("scoring failure: {0}")]
    ScoringFailure(String),

    /// Unexpected arithmetic or storage failure for one symbol's bucket.
    #[error("computation error for {symbol}: {message}")]
    ComputationError { symbol: String, message: String },
}
