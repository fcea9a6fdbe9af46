use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crowd_pulse_core::{
    symbols::default_symbols, AppConfig, ConfigLoader, DataMode, DiscussionSource,
    MarketDataSource, SentimentScorer, Service, TimeWindow,
};
use crowd_pulse_data::{
    create_schema, MarketRepository, PostRepository, SentimentRepository, SignalRepository,
    UsageLogRepository,
};
use crowd_pulse_orchestrator::{spawn_pipeline, PipelineDeps, PipelineHandle};
use crowd_pulse_sources::{
    FeedConfig, FeedSource, HttpScorer, HttpScorerConfig, LexiconScorer, MarketFeedConfig,
    MarketFeedSource, QuotaLedger,
};
use crowd_pulse_web_api::{ApiServer, ApiState};

mod seed;

#[derive(Parser)]
#[command(name = "crowd-pulse")]
#[command(about = "Behavioural-risk signal engine for equity social sentiment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web API server
    Server {
        /// Server address (overrides config)
        #[arg(short, long)]
        addr: Option<String>,
        /// Data mode: test or live
        #[arg(short, long, default_value = "test")]
        mode: String,
    },
    /// Run the ingestion pipeline once
    Run {
        /// Window length in hours
        #[arg(long, default_value_t = 24)]
        hours: i64,
        /// Data mode: test or live
        #[arg(short, long, default_value = "test")]
        mode: String,
    },
    /// Seed sample test data
    Seed {
        /// Spread of seeded posts, in hours
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Show row counts per table
    Status {
        /// Data mode: test or live
        #[arg(short, long, default_value = "test")]
        mode: String,
    },
    /// Show today's API usage per service
    Usage,
    /// Initialize database tables
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Server { addr, mode } => {
            let mode = DataMode::from_str(&mode)?;
            let pool = connect(&config).await?;
            create_schema(&pool).await?;
            let (pipeline, ledger) = build_pipeline(&config, &pool);
            let state = Arc::new(ApiState {
                pipeline,
                signals: SignalRepository::new(pool),
                ledger,
                mode,
            });
            let addr = addr.unwrap_or_else(|| {
                format!("{}:{}", config.server.host, config.server.port)
            });
            ApiServer::new(state).serve(&addr).await?;
        }
        Commands::Run { hours, mode } => {
            let mode = DataMode::from_str(&mode)?;
            let pool = connect(&config).await?;
            create_schema(&pool).await?;
            let (pipeline, ledger) = build_pipeline(&config, &pool);
            run_once(&pipeline, hours, mode).await?;
            print_usage(&ledger);
        }
        Commands::Seed { hours } => {
            let pool = connect(&config).await?;
            create_schema(&pool).await?;
            seed::seed_sample_data(&pool, hours, DataMode::Test).await?;
        }
        Commands::Status { mode } => {
            let mode = DataMode::from_str(&mode)?;
            let pool = connect(&config).await?;
            print_status(&pool, mode).await?;
        }
        Commands::Usage => {
            let ledger = QuotaLedger::new(&config.quota);
            print_usage(&Arc::new(ledger));
        }
        Commands::InitDb => {
            let pool = connect(&config).await?;
            create_schema(&pool).await?;
        }
    }

    Ok(())
}

async fn connect(config: &AppConfig) -> Result<sqlx::PgPool> {
    crowd_pulse_data::connect(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")
}

/// Wires sources, scorer, repositories and quota ledger into a pipeline.
fn build_pipeline(config: &AppConfig, pool: &sqlx::PgPool) -> (PipelineHandle, Arc<QuotaLedger>) {
    let ledger = Arc::new(
        QuotaLedger::new(&config.quota).with_audit(UsageLogRepository::new(pool.clone())),
    );

    let mut discussion_sources: Vec<Arc<dyn DiscussionSource>> = Vec::new();
    for (service, url) in [
        (Service::Telegram, &config.ingestion.telegram_feed_url),
        (Service::Youtube, &config.ingestion.youtube_feed_url),
        (Service::Twitter, &config.ingestion.twitter_feed_url),
    ] {
        if url.is_empty() {
            tracing::warn!("{} feed not configured, source disabled", service);
            continue;
        }
        discussion_sources.push(Arc::new(FeedSource::new(FeedConfig::new(service, url))));
    }

    let market_source: Option<Arc<dyn MarketDataSource>> =
        if config.ingestion.market_feed_url.is_empty() {
            tracing::warn!("Market feed not configured, source disabled");
            None
        } else {
            Some(Arc::new(MarketFeedSource::new(MarketFeedConfig::new(
                &config.ingestion.market_feed_url,
            ))))
        };

    let (scorer, scoring_uses_quota): (Arc<dyn SentimentScorer>, bool) =
        if config.ingestion.scoring_url.is_empty() {
            (Arc::new(LexiconScorer::new()), false)
        } else {
            (
                Arc::new(HttpScorer::new(HttpScorerConfig::new(
                    &config.ingestion.scoring_url,
                ))),
                true,
            )
        };

    let deps = PipelineDeps {
        ledger: Arc::clone(&ledger),
        discussion_sources,
        market_source,
        scorer,
        scoring_uses_quota,
        posts: PostRepository::new(pool.clone()),
        sentiment: SentimentRepository::new(pool.clone()),
        market: MarketRepository::new(pool.clone()),
        signals: SignalRepository::new(pool.clone()),
        symbols: default_symbols(),
        ingestion: config.ingestion.clone(),
        signal: config.signal.clone(),
    };

    (spawn_pipeline(deps), ledger)
}

async fn run_once(pipeline: &PipelineHandle, hours: i64, mode: DataMode) -> Result<()> {
    let (mut progress, result) = pipeline
        .run(TimeWindow::last_hours(hours), mode)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    while let Some(event) = progress.recv().await {
        tracing::info!("[{:>3}%] {}: {}", event.progress, event.step, event.message);
    }

    let run = result.await.context("Pipeline actor dropped the run")?;
    tracing::info!("Run finished with status {:?}: {}", run.status, run.summary());
    Ok(())
}

async fn print_status(pool: &sqlx::PgPool, mode: DataMode) -> Result<()> {
    let posts = PostRepository::new(pool.clone()).count(mode).await?;
    let scored = SentimentRepository::new(pool.clone()).count(mode).await?;
    let market = MarketRepository::new(pool.clone()).count(mode).await?;
    let signals = SignalRepository::new(pool.clone()).count(mode).await?;

    tracing::info!("=== Pipeline Status ({} mode) ===", mode);
    tracing::info!("  Social Posts:      {}", posts);
    tracing::info!("  Sentiment Records: {}", scored);
    tracing::info!("  Market Data Rows:  {}", market);
    tracing::info!("  Signal Rows:       {}", signals);
    tracing::info!("  Unscored Posts:    {}", posts - scored);
    Ok(())
}

fn print_usage(ledger: &Arc<QuotaLedger>) {
    let summary = ledger.usage_summary(chrono::Utc::now().date_naive());
    tracing::info!("=== API Usage ({}) ===", summary.date);
    for usage in &summary.services {
        let pct = if usage.limit > 0 {
            f64::from(usage.used) / f64::from(usage.limit) * 100.0
        } else {
            100.0
        };
        let filled = (pct / 5.0) as usize;
        let bar = format!("{}{}", "#".repeat(filled.min(20)), ".".repeat(20 - filled.min(20)));
        let status = if usage.blocked {
            "BLOCKED".to_string()
        } else {
            format!("{} left", usage.remaining)
        };
        tracing::info!(
            "  {:<10} [{}] {}/{} ({:.0}%) — {}",
            usage.service.as_str(),
            bar,
            usage.used,
            usage.limit,
            pct,
            status
        );
    }
}
