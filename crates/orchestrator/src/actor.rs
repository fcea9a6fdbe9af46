//! Pipeline actor: executes runs one at a time.
//!
//! Steps run in a fixed order — each discussion source, the market source,
//! scoring, signal computation. A blocked or failing step never aborts the
//! run; its outcome is recorded and the next step proceeds. The overall
//! status becomes an error only when every step failed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DurationRound, Utc};
use crowd_pulse_core::{
    DataMode, DiscussionSource, IngestionConfig, MarketDataSource, RunStatus, SentimentScorer,
    SignalConfig, StepOutcome, TimeWindow,
};
use crowd_pulse_data::{
    MarketDataRecord, MarketRepository, PostRepository, SentimentRecordRow, SentimentRepository,
    SignalRepository, SocialPostRecord,
};
use crowd_pulse_engine::assemble_signal;
use crowd_pulse_sources::{clean_text, extract_symbol, CallOutcome, CallStatus, QuotaLedger};
use tokio::sync::mpsc;

use crate::commands::PipelineCommand;
use crate::progress::ProgressSink;
use crate::run::PipelineRun;

/// Longest failure message recorded in a step outcome.
const MAX_ERROR_CHARS: usize = 120;

/// Everything a pipeline run needs, injected once at spawn time.
pub struct PipelineDeps {
    pub ledger: Arc<QuotaLedger>,
    pub discussion_sources: Vec<Arc<dyn DiscussionSource>>,
    pub market_source: Option<Arc<dyn MarketDataSource>>,
    pub scorer: Arc<dyn SentimentScorer>,
    /// Whether scoring spends quota (remote model) or is free (lexicon).
    pub scoring_uses_quota: bool,
    pub posts: PostRepository,
    pub sentiment: SentimentRepository,
    pub market: MarketRepository,
    pub signals: SignalRepository,
    pub symbols: Vec<String>,
    pub ingestion: IngestionConfig,
    pub signal: SignalConfig,
}

pub struct PipelineActor {
    rx: mpsc::Receiver<PipelineCommand>,
    deps: PipelineDeps,
}

impl PipelineActor {
    #[must_use]
    pub fn new(rx: mpsc::Receiver<PipelineCommand>, deps: PipelineDeps) -> Self {
        Self { rx, deps }
    }

    /// Processes commands until shutdown. Runs execute strictly one at a
    /// time — this loop is the system-wide serialization point.
    pub async fn run(mut self) -> anyhow::Result<()> {
        tracing::info!("Pipeline actor started");

        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                PipelineCommand::Run {
                    window,
                    mode,
                    progress,
                    result,
                } => {
                    let mut sink = ProgressSink::new(progress);
                    let run = self.execute(window, mode, &mut sink).await;
                    // Requester may have hung up; the run is complete either way
                    let _ = result.send(run);
                }
                PipelineCommand::Shutdown => {
                    tracing::info!("Pipeline actor shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn execute(
        &self,
        window: TimeWindow,
        mode: DataMode,
        sink: &mut ProgressSink,
    ) -> PipelineRun {
        tracing::info!("Pipeline run starting ({} mode, {:?})", mode, window);
        let mut run = PipelineRun::start(window, mode);
        let today = Utc::now().date_naive();
        let total_steps = self.deps.discussion_sources.len() + 3;
        let mut index = 0usize;

        for source in &self.deps.discussion_sources {
            let step = source.service().as_str();
            sink.emit(step, format!("Scraping {step}..."), percent(index, total_steps))
                .await;
            let outcome = self
                .discussion_step(source.as_ref(), step, &window, mode, today)
                .await;
            sink.emit(step, outcome.message.clone(), percent(index + 1, total_steps))
                .await;
            run.record_step(outcome);
            index += 1;
        }

        sink.emit("market", "Fetching market data...", percent(index, total_steps))
            .await;
        let outcome = self.market_step(&window, mode, today).await;
        sink.emit("market", outcome.message.clone(), percent(index + 1, total_steps))
            .await;
        run.record_step(outcome);
        index += 1;

        sink.emit("scoring", "Scoring sentiment...", percent(index, total_steps))
            .await;
        let outcome = self.scoring_step(mode, today).await;
        sink.emit("scoring", outcome.message.clone(), percent(index + 1, total_steps))
            .await;
        run.record_step(outcome);
        index += 1;

        sink.emit(
            "signals",
            "Computing divergence & confidence signals...",
            percent(index, total_steps),
        )
        .await;
        let outcome = self.signals_step(mode).await;
        sink.emit("signals", outcome.message.clone(), percent(index + 1, total_steps))
            .await;
        run.record_step(outcome);

        run.finalize();
        match run.status {
            RunStatus::Error => {
                tracing::error!("Pipeline run failed: {}", run.summary());
                sink.fail(format!("Pipeline failed: {}", run.summary())).await;
            }
            _ => {
                tracing::info!("Pipeline run complete: {}", run.summary());
                sink.finish(format!("Pipeline complete! {}", run.summary()))
                    .await;
            }
        }
        run
    }

    async fn discussion_step(
        &self,
        source: &dyn DiscussionSource,
        step: &str,
        window: &TimeWindow,
        mode: DataMode,
        today: chrono::NaiveDate,
    ) -> StepOutcome {
        if mode == DataMode::Test {
            return StepOutcome::skipped(step, "skipped (test mode)");
        }

        let service = source.service();
        if !self.deps.ledger.check_and_reserve(service, today).is_allowed() {
            self.deps
                .ledger
                .record_outcome(
                    service,
                    today,
                    CallOutcome {
                        endpoint: None,
                        status: CallStatus::Blocked,
                        latency_ms: None,
                        records_fetched: 0,
                    },
                )
                .await;
            return StepOutcome::skipped(step, "skipped: quota exceeded");
        }

        let timeout = Duration::from_secs(self.deps.ingestion.source_timeout_secs);
        let started = Instant::now();
        let fetched =
            tokio::time::timeout(timeout, source.fetch(window, self.deps.ingestion.fetch_budget))
                .await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match fetched {
            Ok(Ok(posts)) => {
                let records: Vec<SocialPostRecord> = posts
                    .iter()
                    .map(|p| SocialPostRecord::from_raw(p, mode))
                    .collect();
                match self.deps.posts.insert_batch(&records).await {
                    Ok(inserted) => {
                        self.deps
                            .ledger
                            .record_outcome(
                                service,
                                today,
                                CallOutcome {
                                    endpoint: None,
                                    status: CallStatus::Success,
                                    latency_ms: Some(latency_ms),
                                    records_fetched: inserted as i32,
                                },
                            )
                            .await;
                        StepOutcome::completed(
                            step,
                            inserted,
                            format!("{step}: {inserted} new posts ({} fetched)", posts.len()),
                        )
                    }
                    Err(e) => {
                        self.record_error(service, today, latency_ms, &e.to_string()).await;
                        StepOutcome::failed(step, truncate(&format!("store failed: {e}")))
                    }
                }
            }
            Ok(Err(e)) => {
                self.record_error(service, today, latency_ms, &e.to_string()).await;
                StepOutcome::failed(step, truncate(&e.to_string()))
            }
            Err(_) => {
                let message = format!(
                    "timed out after {}s",
                    self.deps.ingestion.source_timeout_secs
                );
                self.record_error(service, today, latency_ms, &message).await;
                StepOutcome::failed(step, message)
            }
        }
    }

    async fn market_step(
        &self,
        window: &TimeWindow,
        mode: DataMode,
        today: chrono::NaiveDate,
    ) -> StepOutcome {
        if mode == DataMode::Test {
            return StepOutcome::skipped("market", "skipped (test mode)");
        }
        let Some(ref source) = self.deps.market_source else {
            return StepOutcome::skipped("market", "skipped (not configured)");
        };

        let service = crowd_pulse_core::Service::Market;
        if !self.deps.ledger.check_and_reserve(service, today).is_allowed() {
            self.deps
                .ledger
                .record_outcome(
                    service,
                    today,
                    CallOutcome {
                        endpoint: None,
                        status: CallStatus::Blocked,
                        latency_ms: None,
                        records_fetched: 0,
                    },
                )
                .await;
            return StepOutcome::skipped("market", "skipped: quota exceeded");
        }

        let timeout = Duration::from_secs(self.deps.ingestion.source_timeout_secs);
        let started = Instant::now();
        let fetched =
            tokio::time::timeout(timeout, source.fetch(&self.deps.symbols, window)).await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match fetched {
            Ok(Ok(bars)) => {
                let records: Vec<MarketDataRecord> = bars
                    .iter()
                    .map(|b| MarketDataRecord::from_bar(b, mode))
                    .collect();
                match self.deps.market.upsert_batch(&records).await {
                    Ok(written) => {
                        self.deps
                            .ledger
                            .record_outcome(
                                service,
                                today,
                                CallOutcome {
                                    endpoint: None,
                                    status: CallStatus::Success,
                                    latency_ms: Some(latency_ms),
                                    records_fetched: written as i32,
                                },
                            )
                            .await;
                        StepOutcome::completed(
                            "market",
                            written,
                            format!("Market data: {written} bars stored"),
                        )
                    }
                    Err(e) => {
                        self.record_error(service, today, latency_ms, &e.to_string()).await;
                        StepOutcome::failed("market", truncate(&format!("store failed: {e}")))
                    }
                }
            }
            Ok(Err(e)) => {
                self.record_error(service, today, latency_ms, &e.to_string()).await;
                StepOutcome::failed("market", truncate(&e.to_string()))
            }
            Err(_) => {
                let message = format!(
                    "timed out after {}s",
                    self.deps.ingestion.source_timeout_secs
                );
                self.record_error(service, today, latency_ms, &message).await;
                StepOutcome::failed("market", message)
            }
        }
    }

    async fn scoring_step(&self, mode: DataMode, today: chrono::NaiveDate) -> StepOutcome {
        let service = crowd_pulse_core::Service::Scoring;
        let spends_quota = self.deps.scoring_uses_quota && mode == DataMode::Live;
        if spends_quota && !self.deps.ledger.check_and_reserve(service, today).is_allowed() {
            return StepOutcome::skipped("scoring", "skipped: quota exceeded");
        }

        let unscored = match self
            .deps
            .posts
            .query_unscored(
                self.deps.scorer.model_id(),
                mode,
                self.deps.ingestion.scoring_batch_size,
            )
            .await
        {
            Ok(posts) => posts,
            Err(e) => return StepOutcome::failed("scoring", truncate(&e.to_string())),
        };

        if unscored.is_empty() {
            return StepOutcome::completed("scoring", 0, "No unscored posts");
        }

        // Normalise text and attribute symbols before classification
        let mut cleaned_texts = Vec::with_capacity(unscored.len());
        let mut attributed = Vec::with_capacity(unscored.len());
        for post in &unscored {
            let cleaned = clean_text(&post.raw_text);
            let symbol = post
                .symbol
                .clone()
                .unwrap_or_else(|| extract_symbol(&post.raw_text));
            if let Some(id) = post.id {
                if let Err(e) = self
                    .deps
                    .posts
                    .update_normalisation(id, &cleaned, &symbol)
                    .await
                {
                    tracing::warn!("Could not update normalisation for post {}: {}", id, e);
                }
            }
            cleaned_texts.push(cleaned);
            attributed.push(symbol);
        }

        let started = Instant::now();
        let outcomes = match self.deps.scorer.score_batch(&cleaned_texts).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                if spends_quota {
                    self.record_error(
                        service,
                        today,
                        started.elapsed().as_secs_f64() * 1000.0,
                        &e.to_string(),
                    )
                    .await;
                }
                return StepOutcome::failed("scoring", truncate(&e.to_string()));
            }
        };

        let mut records = Vec::with_capacity(unscored.len());
        for ((post, outcome), symbol) in unscored.iter().zip(&outcomes).zip(&attributed) {
            let Some(post_id) = post.id else { continue };
            let scored_at = post.posted_at.unwrap_or_else(Utc::now);
            records.push(SentimentRecordRow::new(
                post_id,
                Some(symbol.clone()),
                outcome.label,
                outcome.probability,
                self.deps.scorer.model_id(),
                scored_at,
                mode,
            ));
        }

        match self.deps.sentiment.insert_batch(&records).await {
            Ok(scored) => {
                if spends_quota {
                    self.deps
                        .ledger
                        .record_outcome(
                            service,
                            today,
                            CallOutcome {
                                endpoint: None,
                                status: CallStatus::Success,
                                latency_ms: Some(started.elapsed().as_secs_f64() * 1000.0),
                                records_fetched: scored as i32,
                            },
                        )
                        .await;
                }
                StepOutcome::completed("scoring", scored, format!("Scored {scored} posts"))
            }
            Err(e) => StepOutcome::failed("scoring", truncate(&format!("store failed: {e}"))),
        }
    }

    async fn signals_step(&self, mode: DataMode) -> StepOutcome {
        let bucket = Utc::now()
            .duration_trunc(chrono::Duration::hours(1))
            .unwrap_or_else(|_| Utc::now());

        let mut computed = 0u64;
        let mut errors = 0usize;

        for symbol in &self.deps.symbols {
            match self.compute_symbol(symbol, bucket, mode).await {
                Ok(true) => computed += 1,
                Ok(false) => {}
                Err(e) => {
                    // One symbol's failure never blocks the others
                    errors += 1;
                    tracing::error!("Signal computation failed for {}: {}", symbol, e);
                }
            }
        }

        if errors > 0 && errors == self.deps.symbols.len() {
            return StepOutcome::failed(
                "signals",
                format!("signal computation failed for all {errors} symbols"),
            );
        }
        StepOutcome::completed("signals", computed, format!("Computed {computed} signals"))
    }

    /// One symbol's computation cycle: bounded trailing queries, pure
    /// assembly, single upsert. Returns whether a row was written.
    async fn compute_symbol(
        &self,
        symbol: &str,
        bucket: chrono::DateTime<Utc>,
        mode: DataMode,
    ) -> anyhow::Result<bool> {
        let history_start = bucket - chrono::Duration::days(self.deps.signal.zscore_lookback as i64);

        let sentiment = self
            .deps
            .sentiment
            .query_by_symbol(symbol, history_start, bucket, mode)
            .await?;
        if sentiment.len() < 2 {
            return Ok(false);
        }

        let market = self
            .deps
            .market
            .query_with_delivery(symbol, history_start, bucket, mode)
            .await?;
        let recent_divergence = self
            .deps
            .signals
            .recent_divergence(
                symbol,
                bucket,
                self.deps.signal.consistency_lookback as i64,
                mode,
            )
            .await?;

        let Some(record) = assemble_signal(
            symbol,
            bucket,
            &sentiment,
            &market,
            &recent_divergence,
            &self.deps.signal,
            mode,
        ) else {
            return Ok(false);
        };

        self.deps.signals.upsert(&record).await?;
        Ok(true)
    }

    async fn record_error(
        &self,
        service: crowd_pulse_core::Service,
        today: chrono::NaiveDate,
        latency_ms: f64,
        message: &str,
    ) {
        self.deps
            .ledger
            .record_outcome(
                service,
                today,
                CallOutcome {
                    endpoint: None,
                    status: CallStatus::Error(message.to_string()),
                    latency_ms: Some(latency_ms),
                    records_fetched: 0,
                },
            )
            .await;
    }
}

/// Even progress ladder: steps span 2..=98, the terminal event owns 100.
fn percent(step: usize, total_steps: usize) -> u8 {
    if total_steps == 0 {
        return 2;
    }
    (2 + step * 96 / total_steps) as u8
}

fn truncate(message: &str) -> String {
    if message.len() <= MAX_ERROR_CHARS {
        message.to_string()
    } else {
        let cut: String = message.chars().take(MAX_ERROR_CHARS).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::spawn_pipeline;
    use anyhow::Result;
    use async_trait::async_trait;
    use crowd_pulse_core::{QuotaConfig, RawPost, Service};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Pool that never connects; repo calls fail fast, which is exactly
    /// what the partial-failure tests need.
    fn dead_pool() -> sqlx::PgPool {
        PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy("postgresql://127.0.0.1:1/unreachable")
            .expect("lazy pool")
    }

    struct MockSource {
        service: Service,
        behaviour: MockBehaviour,
        calls: Arc<AtomicUsize>,
        gate: Option<Arc<Notify>>,
    }

    enum MockBehaviour {
        Empty,
        Hang,
        Error,
    }

    #[async_trait]
    impl DiscussionSource for MockSource {
        fn service(&self) -> Service {
            self.service
        }

        async fn fetch(&self, _window: &TimeWindow, _budget: u32) -> Result<Vec<RawPost>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ref gate) = self.gate {
                gate.notified().await;
            }
            match self.behaviour {
                MockBehaviour::Empty => Ok(Vec::new()),
                MockBehaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
                MockBehaviour::Error => Err(anyhow::anyhow!("upstream unavailable")),
            }
        }
    }

    struct NoopScorer;

    #[async_trait]
    impl SentimentScorer for NoopScorer {
        async fn score_batch(
            &self,
            texts: &[String],
        ) -> Result<Vec<crowd_pulse_core::ScoreOutcome>> {
            Ok(texts
                .iter()
                .map(|_| crowd_pulse_core::ScoreOutcome {
                    label: crowd_pulse_core::SentimentLabel::Neutral,
                    probability: 0.5,
                })
                .collect())
        }

        fn model_id(&self) -> &str {
            "noop-test"
        }
    }

    fn deps(
        sources: Vec<Arc<dyn DiscussionSource>>,
        quota: QuotaConfig,
        timeout_secs: u64,
    ) -> PipelineDeps {
        let pool = dead_pool();
        PipelineDeps {
            ledger: Arc::new(QuotaLedger::new(&quota)),
            discussion_sources: sources,
            market_source: None,
            scorer: Arc::new(NoopScorer),
            scoring_uses_quota: false,
            posts: PostRepository::new(pool.clone()),
            sentiment: SentimentRepository::new(pool.clone()),
            market: MarketRepository::new(pool.clone()),
            signals: SignalRepository::new(pool),
            symbols: vec!["RELIANCE".to_string(), "TCS".to_string()],
            ingestion: IngestionConfig {
                source_timeout_secs: timeout_secs,
                ..IngestionConfig::default()
            },
            signal: SignalConfig::default(),
        }
    }

    fn mock(service: Service, behaviour: MockBehaviour) -> (Arc<MockSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(MockSource {
            service,
            behaviour,
            calls: Arc::clone(&calls),
            gate: None,
        });
        (source, calls)
    }

    async fn drain(
        mut rx: mpsc::Receiver<crowd_pulse_core::ProgressEvent>,
    ) -> Vec<crowd_pulse_core::ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_mode_run_skips_sources_and_terminates() {
        let (telegram, telegram_calls) = mock(Service::Telegram, MockBehaviour::Empty);
        let handle = spawn_pipeline(deps(vec![telegram], QuotaConfig::default(), 5));

        let (progress, result) = handle
            .run(TimeWindow::last_hours(24), DataMode::Test)
            .unwrap();
        let run = result.await.unwrap();
        let events = drain(progress).await;

        // No external call in test mode
        assert_eq!(telegram_calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            run.steps[0].status,
            crowd_pulse_core::StepStatus::Skipped { .. }
        ));
        // Scoring and signals hit the dead pool and fail, but skips are not
        // failures, so the run still finishes as done
        assert_eq!(run.status, RunStatus::Done);

        // Stream terminates with exactly one done event at 100
        let last = events.last().unwrap();
        assert!(last.done);
        assert_eq!(last.progress, 100);
        assert_eq!(events.iter().filter(|e| e.done).count(), 1);

        // And percentages never decrease
        let mut prev = 0u8;
        for event in &events {
            assert!(event.progress >= prev);
            prev = event.progress;
        }
    }

    #[tokio::test]
    async fn timed_out_source_fails_its_step_and_run_continues() {
        let (hanging, _) = mock(Service::Telegram, MockBehaviour::Hang);
        let (healthy, healthy_calls) = mock(Service::Youtube, MockBehaviour::Empty);
        let handle = spawn_pipeline(deps(vec![hanging, healthy], QuotaConfig::default(), 1));

        let (_progress, result) = handle
            .run(TimeWindow::last_hours(24), DataMode::Live)
            .unwrap();
        let run = result.await.unwrap();

        assert!(run.steps[0].status.is_failure());
        assert!(run.steps[0].message.contains("timed out"));
        // The next step still executed and succeeded
        assert_eq!(healthy_calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            run.steps[1].status,
            crowd_pulse_core::StepStatus::Completed
        ));
        assert_eq!(run.status, RunStatus::Done);
    }

    #[tokio::test]
    async fn erroring_source_is_recorded_and_run_continues() {
        let (broken, _) = mock(Service::Telegram, MockBehaviour::Error);
        let (healthy, _) = mock(Service::Youtube, MockBehaviour::Empty);
        let handle = spawn_pipeline(deps(vec![broken, healthy], QuotaConfig::default(), 5));

        let (_progress, result) = handle
            .run(TimeWindow::last_hours(24), DataMode::Live)
            .unwrap();
        let run = result.await.unwrap();

        assert!(run.steps[0].status.is_failure());
        assert!(run.steps[0].message.contains("upstream unavailable"));
        assert_eq!(run.status, RunStatus::Done);
    }

    #[tokio::test]
    async fn exhausted_quota_skips_step_without_calling_the_source() {
        let zero_quota = QuotaConfig {
            telegram: 0,
            youtube: 0,
            twitter: 0,
            market: 0,
            scoring: 0,
        };
        let (telegram, calls) = mock(Service::Telegram, MockBehaviour::Empty);
        let handle = spawn_pipeline(deps(vec![telegram], zero_quota, 5));

        let (_progress, result) = handle
            .run(TimeWindow::last_hours(24), DataMode::Live)
            .unwrap();
        let run = result.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(run.steps[0].message.contains("quota exceeded"));
        assert!(matches!(
            run.steps[0].status,
            crowd_pulse_core::StepStatus::Skipped { .. }
        ));
        assert_eq!(run.status, RunStatus::Done);
    }

    #[tokio::test]
    async fn concurrent_run_request_is_rejected() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let blocking = Arc::new(MockSource {
            service: Service::Telegram,
            behaviour: MockBehaviour::Empty,
            calls: Arc::clone(&calls),
            gate: Some(Arc::clone(&gate)),
        });
        let handle = spawn_pipeline(deps(vec![blocking], QuotaConfig::default(), 3600));

        // First run occupies the actor at the gated fetch
        let (mut progress_one, result_one) = handle
            .run(TimeWindow::last_hours(24), DataMode::Live)
            .unwrap();
        // Wait until the first run is demonstrably in flight
        let first_event = progress_one.recv().await.unwrap();
        assert!(!first_event.done);

        // Second request queues; third must be rejected, never run in parallel
        let second = handle.run(TimeWindow::last_hours(24), DataMode::Live);
        assert!(second.is_ok());
        let third = handle.run(TimeWindow::last_hours(24), DataMode::Live);
        assert!(matches!(third, Err(crate::error::PipelineError::Busy)));

        // Release both runs and let them finish serially; notify_one
        // stores a permit for the queued run's later fetch
        gate.notify_one();
        let run_one = result_one.await.unwrap();
        assert!(run_one.status.is_terminal());
        gate.notify_one();
        let (_p2, r2) = second.unwrap();
        let run_two = r2.await.unwrap();
        assert!(run_two.status.is_terminal());
    }

    #[test]
    fn percent_ladder_is_monotonic_and_bounded() {
        let total = 6;
        let mut prev = 0u8;
        for step in 0..=total {
            let p = percent(step, total);
            assert!(p >= prev);
            assert!(p < 100);
            prev = p;
        }
        assert_eq!(percent(0, 0), 2);
    }

    #[test]
    fn truncate_caps_long_messages() {
        let long = "x".repeat(500);
        let cut = truncate(&long);
        assert!(cut.chars().count() <= MAX_ERROR_CHARS + 1);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate("short"), "short");
    }
}
