pub mod database;
pub mod models;
pub mod repositories;

pub use database::{connect, create_schema};
pub use models::{
    DivergenceDirection, MarketDataRecord, SentimentRecordRow, SignalRecord, SocialPostRecord,
    UsageLogRecord,
};
pub use repositories::{
    MarketRepository, PostRepository, SentimentRepository, SignalRepository, UsageLogRepository,
};
