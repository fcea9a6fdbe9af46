use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use crowd_pulse_core::TimeWindow;
use crowd_pulse_data::SignalRecord;
use crowd_pulse_sources::QuotaSummary;
use serde::{Deserialize, Serialize};
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};

use crate::state::ApiState;

#[derive(Deserialize)]
pub struct RunParams {
    /// Window length when no explicit bounds are given.
    pub hours: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub mode: Option<String>,
}

#[derive(Deserialize)]
pub struct RangeParams {
    pub hours: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub mode: Option<String>,
}

#[derive(Serialize)]
pub struct LatestSignalResponse {
    pub symbol: String,
    pub signal: Option<SignalRecord>,
}

#[derive(Serialize)]
pub struct TimeseriesResponse {
    pub symbol: String,
    pub data: Vec<SignalRecord>,
}

#[derive(Serialize)]
pub struct OverviewResponse {
    pub stocks: Vec<SignalRecord>,
}

fn resolve_window(hours: Option<i64>, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> TimeWindow {
    let hours = hours.unwrap_or(24).clamp(1, 720);
    match (start, end) {
        (Some(since), Some(until)) => TimeWindow::new(since, until),
        (Some(since), None) => TimeWindow::new(since, Utc::now()),
        (None, Some(until)) => TimeWindow::new(until - Duration::hours(hours), until),
        (None, None) => TimeWindow::last_hours(hours),
    }
}

/// Kicks off a pipeline run and streams its progress as server-sent
/// events, terminated by a final `done: true` event.
///
/// # Errors
/// Returns `StatusCode::CONFLICT` when a run is already in progress.
pub async fn run_pipeline(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<RunParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let window = resolve_window(params.hours, params.start, params.end);
    let mode = state.resolve_mode(params.mode.as_deref());

    let (progress, _result) = state
        .pipeline
        .run(window, mode)
        .map_err(|_| StatusCode::CONFLICT)?;

    let stream = ReceiverStream::new(progress).map(|event| {
        let sse_event = Event::default()
            .json_data(&event)
            .unwrap_or_else(|_| Event::default().data("{}"));
        Ok(sse_event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Per-service quota usage for the current date.
pub async fn quota(State(state): State<Arc<ApiState>>) -> Json<QuotaSummary> {
    Json(state.ledger.usage_summary(Utc::now().date_naive()))
}

/// Latest signal per symbol across the tracked universe.
///
/// # Errors
/// Returns `StatusCode::INTERNAL_SERVER_ERROR` if the query fails.
pub async fn overview(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<OverviewResponse>, StatusCode> {
    let mode = state.resolve_mode(params.mode.as_deref());
    let stocks = state
        .signals
        .overview(mode)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(OverviewResponse { stocks }))
}

/// Most recent signal row for one symbol.
///
/// # Errors
/// Returns `StatusCode::INTERNAL_SERVER_ERROR` if the query fails.
pub async fn latest_signal(
    State(state): State<Arc<ApiState>>,
    Path(symbol): Path<String>,
    Query(params): Query<RangeParams>,
) -> Result<Json<LatestSignalResponse>, StatusCode> {
    let symbol = symbol.to_uppercase();
    let mode = state.resolve_mode(params.mode.as_deref());
    let signal = state
        .signals
        .latest_by_symbol(&symbol, mode)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(LatestSignalResponse { symbol, signal }))
}

/// Signal timeseries for one symbol, for charting.
///
/// # Errors
/// Returns `StatusCode::INTERNAL_SERVER_ERROR` if the query fails.
pub async fn signal_timeseries(
    State(state): State<Arc<ApiState>>,
    Path(symbol): Path<String>,
    Query(params): Query<RangeParams>,
) -> Result<Json<TimeseriesResponse>, StatusCode> {
    let symbol = symbol.to_uppercase();
    let mode = state.resolve_mode(params.mode.as_deref());
    let window = resolve_window(params.hours.or(Some(72)), params.start, params.end);
    let data = state
        .signals
        .query_range(&symbol, window.since, window.until, mode)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(TimeseriesResponse { symbol, data }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_defaults_to_last_24_hours() {
        let window = resolve_window(None, None, None);
        assert_eq!(window.duration(), Duration::hours(24));
    }

    #[test]
    fn window_clamps_hours() {
        let window = resolve_window(Some(10_000), None, None);
        assert_eq!(window.duration(), Duration::hours(720));
    }

    #[test]
    fn explicit_bounds_win_over_hours() {
        let start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 2, 3, 0, 0, 0).unwrap();
        let window = resolve_window(Some(24), Some(start), Some(end));
        assert_eq!(window.since, start);
        assert_eq!(window.until, end);
    }

    #[test]
    fn end_only_reaches_back_hours() {
        let end = Utc.with_ymd_and_hms(2026, 2, 3, 0, 0, 0).unwrap();
        let window = resolve_window(Some(48), None, Some(end));
        assert_eq!(window.until, end);
        assert_eq!(window.duration(), Duration::hours(48));
    }
}
