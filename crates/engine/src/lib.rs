//! Statistical core: turns scored text and market series into per-symbol
//! behavioural-risk indicators.
//!
//! Everything here is deterministic and computable incrementally — each
//! bucket's result is a pure function of a bounded trailing window, so
//! recomputation never touches historical buckets.

pub mod confidence;
pub mod divergence;
pub mod signal;
pub mod velocity;

pub use confidence::{compute_confidence, data_sufficiency, model_certainty, signal_consistency, ConfidenceWeights};
pub use divergence::{classify_divergence, compute_divergence, divergence_series, rolling_zscore, DivergenceConfig};
pub use signal::assemble_signal;
pub use velocity::{compute_velocity, SentimentObservation, VelocityConfig, VelocityResult};
