pub mod actor;
pub mod commands;
pub mod error;
pub mod handle;
pub mod progress;
pub mod run;

pub use actor::{PipelineActor, PipelineDeps};
pub use commands::PipelineCommand;
pub use error::PipelineError;
pub use handle::{spawn_pipeline, PipelineHandle};
pub use progress::ProgressSink;
pub use run::PipelineRun;
