use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use crowd_pulse_core::{
    DataMode, DiscussionSource, IngestionConfig, QuotaConfig, RawPost, RunStatus, SentimentScorer,
    Service, SignalConfig, StepStatus, TimeWindow,
};
use crowd_pulse_data::{
    MarketRepository, PostRepository, SentimentRepository, SignalRepository,
};
use crowd_pulse_orchestrator::{spawn_pipeline, PipelineDeps};
use crowd_pulse_sources::{LexiconScorer, QuotaLedger};

/// Pool that never connects: repository calls fail fast, which lets the
/// run exercise its partial-failure contract without a database.
fn dead_pool() -> sqlx::PgPool {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy("postgresql://127.0.0.1:1/unreachable")
        .expect("lazy pool")
}

struct EmptySource(Service);

#[async_trait]
impl DiscussionSource for EmptySource {
    fn service(&self) -> Service {
        self.0
    }

    async fn fetch(&self, _window: &TimeWindow, _budget: u32) -> Result<Vec<RawPost>> {
        Ok(Vec::new())
    }
}

struct FailingSource(Service);

#[async_trait]
impl DiscussionSource for FailingSource {
    fn service(&self) -> Service {
        self.0
    }

    async fn fetch(&self, _window: &TimeWindow, _budget: u32) -> Result<Vec<RawPost>> {
        Err(anyhow::anyhow!("connection reset by peer"))
    }
}

fn deps(sources: Vec<Arc<dyn DiscussionSource>>) -> PipelineDeps {
    let pool = dead_pool();
    let scorer: Arc<dyn SentimentScorer> = Arc::new(LexiconScorer::new());
    PipelineDeps {
        ledger: Arc::new(QuotaLedger::new(&QuotaConfig::default())),
        discussion_sources: sources,
        market_source: None,
        scorer,
        scoring_uses_quota: false,
        posts: PostRepository::new(pool.clone()),
        sentiment: SentimentRepository::new(pool.clone()),
        market: MarketRepository::new(pool.clone()),
        signals: SignalRepository::new(pool),
        symbols: vec!["RELIANCE".to_string()],
        ingestion: IngestionConfig::default(),
        signal: SignalConfig::default(),
    }
}

#[tokio::test]
async fn full_run_streams_ordered_progress_and_terminates() {
    let handle = spawn_pipeline(deps(vec![
        Arc::new(EmptySource(Service::Telegram)),
        Arc::new(FailingSource(Service::Youtube)),
        Arc::new(EmptySource(Service::Twitter)),
    ]));

    let (mut progress, result) = handle
        .run(TimeWindow::last_hours(24), DataMode::Live)
        .expect("first run must be accepted");

    let mut events = Vec::new();
    while let Some(event) = progress.recv().await {
        events.push(event);
    }
    let run = result.await.expect("run ledger delivered");

    // Step order is fixed: telegram, youtube, twitter, market, scoring, signals
    let steps: Vec<&str> = run.steps.iter().map(|s| s.step.as_str()).collect();
    assert_eq!(
        steps,
        vec!["telegram", "youtube", "twitter", "market", "scoring", "signals"]
    );

    // The broken source failed, its neighbours did not
    assert!(matches!(run.steps[0].status, StepStatus::Completed));
    assert!(run.steps[1].status.is_failure());
    assert!(matches!(run.steps[2].status, StepStatus::Completed));

    // Partial failure is not a run failure
    assert_eq!(run.status, RunStatus::Done);

    // Progress contract: monotone, single terminal event at 100
    let mut prev = 0u8;
    for event in &events {
        assert!(event.progress >= prev, "progress regressed");
        prev = event.progress;
    }
    assert_eq!(events.iter().filter(|e| e.done).count(), 1);
    let last = events.last().expect("at least one event");
    assert!(last.done);
    assert_eq!(last.progress, 100);
    assert!(run.finished_at.unwrap() >= run.started_at);
}

#[tokio::test]
async fn test_mode_makes_no_external_calls() {
    struct CountingSource(Arc<std::sync::atomic::AtomicUsize>);

    #[async_trait]
    impl DiscussionSource for CountingSource {
        fn service(&self) -> Service {
            Service::Telegram
        }

        async fn fetch(&self, _window: &TimeWindow, _budget: u32) -> Result<Vec<RawPost>> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let handle = spawn_pipeline(deps(vec![Arc::new(CountingSource(Arc::clone(&calls)))]));

    let (_progress, result) = handle
        .run(TimeWindow::last_hours(6), DataMode::Test)
        .expect("run accepted");
    let run = result.await.expect("run ledger delivered");

    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(matches!(run.steps[0].status, StepStatus::Skipped { .. }));
    assert!(run.status.is_terminal());
}

#[tokio::test]
async fn run_window_is_preserved_in_the_ledger() {
    let handle = spawn_pipeline(deps(vec![Arc::new(EmptySource(Service::Telegram))]));
    let window = TimeWindow::last_hours(48);

    let (_progress, result) = handle.run(window, DataMode::Live).expect("run accepted");
    let run = result.await.expect("run ledger delivered");

    assert_eq!(run.window, window);
    assert_eq!(run.mode, DataMode::Live);
    assert!(run.started_at <= Utc::now());
}
