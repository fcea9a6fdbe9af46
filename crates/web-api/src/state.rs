//! Shared state handed to every handler.

use crowd_pulse_core::DataMode;
use crowd_pulse_data::SignalRepository;
use crowd_pulse_orchestrator::PipelineHandle;
use crowd_pulse_sources::QuotaLedger;
use std::sync::Arc;

pub struct ApiState {
    pub pipeline: PipelineHandle,
    pub signals: SignalRepository,
    pub ledger: Arc<QuotaLedger>,
    /// Process-wide default mode; individual requests may override it
    /// with a `mode` query parameter.
    pub mode: DataMode,
}

impl ApiState {
    /// Resolves the effective mode for a request.
    #[must_use]
    pub fn resolve_mode(&self, requested: Option<&str>) -> DataMode {
        requested
            .and_then(DataMode::parse)
            .unwrap_or(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_resolution_prefers_valid_override() {
        // resolve_mode is pure over its inputs; exercise it via a free fn
        fn resolve(default: DataMode, requested: Option<&str>) -> DataMode {
            requested.and_then(DataMode::parse).unwrap_or(default)
        }

        assert_eq!(resolve(DataMode::Test, Some("live")), DataMode::Live);
        assert_eq!(resolve(DataMode::Test, Some("demo")), DataMode::Test);
        assert_eq!(resolve(DataMode::Live, None), DataMode::Live);
    }
}
