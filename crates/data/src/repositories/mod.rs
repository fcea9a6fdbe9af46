pub mod market_repo;
pub mod post_repo;
pub mod sentiment_repo;
pub mod signal_repo;
pub mod usage_log_repo;

pub use market_repo::MarketRepository;
pub use post_repo::PostRepository;
pub use sentiment_repo::SentimentRepository;
pub use signal_repo::SignalRepository;
pub use usage_log_repo::UsageLogRepository;
