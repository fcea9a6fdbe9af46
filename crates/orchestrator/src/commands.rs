//! Commands accepted by the pipeline actor.

use crate::run::PipelineRun;
use crowd_pulse_core::{DataMode, ProgressEvent, TimeWindow};
use tokio::sync::{mpsc, oneshot};

#[derive(Debug)]
pub enum PipelineCommand {
    /// Execute one run. Progress events stream to `progress`; the final
    /// run ledger is delivered on `result` once terminal.
    Run {
        window: TimeWindow,
        mode: DataMode,
        progress: mpsc::Sender<ProgressEvent>,
        result: oneshot::Sender<PipelineRun>,
    },
    Shutdown,
}
