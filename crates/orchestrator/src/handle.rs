//! Cloneable handle to the pipeline actor.
//!
//! The command channel is bounded at one slot: while a run executes, a
//! single follow-up request may queue behind it, and anything beyond that
//! is rejected. Two runs can never execute concurrently — they would race
//! on the quota counters and the per-symbol rolling windows.

use crate::actor::{PipelineActor, PipelineDeps};
use crate::commands::PipelineCommand;
use crate::error::PipelineError;
use crate::run::PipelineRun;
use crowd_pulse_core::{DataMode, ProgressEvent, TimeWindow};
use tokio::sync::{mpsc, oneshot};

/// Capacity of the run's progress event buffer. Generous enough that a
/// slow subscriber sees every step message before falling behind.
const PROGRESS_BUFFER: usize = 64;

#[derive(Clone)]
pub struct PipelineHandle {
    tx: mpsc::Sender<PipelineCommand>,
}

impl PipelineHandle {
    #[must_use]
    pub const fn new(tx: mpsc::Sender<PipelineCommand>) -> Self {
        Self { tx }
    }

    /// Requests a run over `window` in `mode`.
    ///
    /// Returns the run's ordered progress stream and a receiver for the
    /// final run ledger.
    ///
    /// # Errors
    /// Returns [`PipelineError::Busy`] when a run is executing and the
    /// one-deep queue is already occupied.
    pub fn run(
        &self,
        window: TimeWindow,
        mode: DataMode,
    ) -> Result<(mpsc::Receiver<ProgressEvent>, oneshot::Receiver<PipelineRun>), PipelineError>
    {
        let (progress_tx, progress_rx) = mpsc::channel(PROGRESS_BUFFER);
        let (result_tx, result_rx) = oneshot::channel();

        self.tx
            .try_send(PipelineCommand::Run {
                window,
                mode,
                progress: progress_tx,
                result: result_tx,
            })
            .map_err(|_| PipelineError::Busy)?;

        Ok((progress_rx, result_rx))
    }

    /// Shuts down the actor after any in-flight run completes.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(PipelineCommand::Shutdown).await;
    }
}

/// Spawns the pipeline actor and returns its handle.
#[must_use]
pub fn spawn_pipeline(deps: PipelineDeps) -> PipelineHandle {
    let (tx, rx) = mpsc::channel(1);
    let actor = PipelineActor::new(rx, deps);
    tokio::spawn(async move {
        if let Err(e) = actor.run().await {
            tracing::error!("Pipeline actor error: {}", e);
        }
    });
    PipelineHandle::new(tx)
}
