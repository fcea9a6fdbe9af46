pub mod config;
pub mod config_loader;
pub mod events;
pub mod mode;
pub mod sentiment;
pub mod service;
pub mod symbols;
pub mod traits;
pub mod window;

pub use config::{AppConfig, DatabaseConfig, IngestionConfig, QuotaConfig, ServerConfig, SignalConfig};
pub use config_loader::ConfigLoader;
pub use events::{ProgressEvent, RunStatus, StepOutcome, StepStatus};
pub use mode::DataMode;
pub use sentiment::SentimentLabel;
pub use service::Service;
pub use traits::{DiscussionSource, MarketBar, MarketDataSource, RawPost, ScoreOutcome, SentimentScorer};
pub use window::TimeWindow;
