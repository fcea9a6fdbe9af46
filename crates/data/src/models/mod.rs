pub mod market_data;
pub mod sentiment_record;
pub mod signal;
pub mod social_post;
pub mod usage_log;

pub use market_data::MarketDataRecord;
pub use sentiment_record::SentimentRecordRow;
pub use signal::{DivergenceDirection, SignalRecord};
pub use social_post::SocialPostRecord;
pub use usage_log::UsageLogRecord;
