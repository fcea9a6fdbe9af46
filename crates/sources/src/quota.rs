//! Daily quota ledger for all external services.
//!
//! Tracks, per service per calendar day, calls made against calls allowed,
//! and gates every outbound call. Reservation is pessimistic: the counter
//! is incremented before the call is attempted, and a failed call does not
//! refund its slot — upstream providers charge for failed and throttled
//! requests too, and never rolling back keeps the ledger race-free.
//!
//! Blocked state is sticky until the date rolls over; the first check on a
//! new date lazily resets the counters, so no background job is needed.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use crowd_pulse_core::{QuotaConfig, Service};
use crowd_pulse_data::{UsageLogRecord, UsageLogRepository};
use serde::Serialize;

/// Result of a reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// The call slot is reserved; counters already include it.
    Allowed { used: u32, limit: u32 },
    /// The daily budget is exhausted; no call may be attempted.
    Blocked { used: u32, limit: u32 },
}

impl QuotaDecision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allowed { .. })
    }
}

/// How an attempted call turned out, for the audit log.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub endpoint: Option<String>,
    pub status: CallStatus,
    pub latency_ms: Option<f64>,
    pub records_fetched: i32,
}

#[derive(Debug, Clone)]
pub enum CallStatus {
    Success,
    Blocked,
    Error(String),
}

impl CallStatus {
    #[must_use]
    const fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Success => "success",
            CallStatus::Blocked => "blocked",
            CallStatus::Error(_) => "error",
        }
    }
}

/// Per-service usage snapshot for the current date.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceUsage {
    pub service: Service,
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub blocked: bool,
}

/// All services' usage plus the derived any-blocked flag.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaSummary {
    pub date: NaiveDate,
    pub services: Vec<ServiceUsage>,
    pub any_blocked: bool,
}

struct DayState {
    date: NaiveDate,
    used: HashMap<Service, u32>,
}

/// The one piece of hot shared mutable state in the pipeline. All counter
/// updates are compare-and-increment under the mutex, never read-then-write
/// across the lock.
pub struct QuotaLedger {
    limits: HashMap<Service, u32>,
    state: Mutex<DayState>,
    audit: Option<UsageLogRepository>,
}

impl QuotaLedger {
    #[must_use]
    pub fn new(config: &QuotaConfig) -> Self {
        let limits = HashMap::from([
            (Service::Telegram, config.telegram),
            (Service::Youtube, config.youtube),
            (Service::Twitter, config.twitter),
            (Service::Market, config.market),
            (Service::Scoring, config.scoring),
        ]);
        Self {
            limits,
            state: Mutex::new(DayState {
                date: NaiveDate::MIN,
                used: HashMap::new(),
            }),
            audit: None,
        }
    }

    /// Attaches the audit log repository. Without one, audit entries are
    /// skipped (unit tests, dry runs).
    #[must_use]
    pub fn with_audit(mut self, repo: UsageLogRepository) -> Self {
        self.audit = Some(repo);
        self
    }

    /// Reserves one call slot for `service` on `date`.
    ///
    /// Allowed increments the counter before the caller attempts the call,
    /// so concurrent callers cannot both slip under the limit.
    pub fn check_and_reserve(&self, service: Service, date: NaiveDate) -> QuotaDecision {
        let limit = self.limit_for(service);
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        if state.date != date {
            state.date = date;
            state.used.clear();
        }

        let used = state.used.entry(service).or_insert(0);
        if *used >= limit {
            tracing::warn!(
                "API limit reached: {} — {}/{} used on {}, call blocked",
                service,
                used,
                limit,
                date
            );
            return QuotaDecision::Blocked { used: *used, limit };
        }

        *used += 1;
        let new_total = *used;
        drop(state);

        let pct = if limit > 0 {
            f64::from(new_total) / f64::from(limit) * 100.0
        } else {
            0.0
        };
        let prev_pct = if limit > 0 {
            f64::from(new_total - 1) / f64::from(limit) * 100.0
        } else {
            0.0
        };
        // Warn at the 50/80/90% milestones and on every call past 90%
        if pct >= 90.0
            || (pct >= 80.0 && prev_pct < 80.0)
            || (pct >= 50.0 && prev_pct < 50.0)
        {
            tracing::warn!("API usage: {} — {}/{} ({:.0}%) used today", service, new_total, limit, pct);
        } else {
            tracing::info!("API call: {} — {}/{} ({:.0}%) used today", service, new_total, limit, pct);
        }

        QuotaDecision::Allowed { used: new_total, limit }
    }

    /// Whether the service is exhausted for `date` without reserving.
    #[must_use]
    pub fn is_blocked(&self, service: Service, date: NaiveDate) -> bool {
        let limit = self.limit_for(service);
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if state.date != date {
            // Fresh day, counters reset lazily on the next reservation
            return limit == 0;
        }
        state.used.get(&service).copied().unwrap_or(0) >= limit
    }

    /// Appends the call's outcome to the audit log. Audit failures are
    /// logged and swallowed — accounting must never break ingestion.
    pub async fn record_outcome(&self, service: Service, date: NaiveDate, outcome: CallOutcome) {
        let Some(ref audit) = self.audit else {
            return;
        };

        let (used, limit) = self.usage_for(service, date);
        let mut record = UsageLogRecord::new(service.as_str(), outcome.status.as_str())
            .with_records(outcome.records_fetched)
            .with_daily(used, limit);
        if let Some(endpoint) = outcome.endpoint {
            record = record.with_endpoint(endpoint);
        }
        if let Some(ms) = outcome.latency_ms {
            record = record.with_latency_ms(ms);
        }
        if let CallStatus::Error(ref message) = outcome.status {
            record = record.with_error(message.clone());
        }

        if let Err(e) = audit.append(&record).await {
            tracing::debug!("Could not append usage audit entry: {}", e);
        }
    }

    /// Usage snapshot for every service on `date`.
    #[must_use]
    pub fn usage_summary(&self, date: NaiveDate) -> QuotaSummary {
        let mut services = Vec::new();
        for service in Service::all() {
            let (used, limit) = self.usage_for(service, date);
            services.push(ServiceUsage {
                service,
                used,
                limit,
                remaining: limit.saturating_sub(used),
                blocked: used >= limit,
            });
        }
        let any_blocked = services.iter().any(|s| s.blocked);
        QuotaSummary {
            date,
            services,
            any_blocked,
        }
    }

    fn usage_for(&self, service: Service, date: NaiveDate) -> (u32, u32) {
        let limit = self.limit_for(service);
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let used = if state.date == date {
            state.used.get(&service).copied().unwrap_or(0)
        } else {
            0
        };
        (used, limit)
    }

    fn limit_for(&self, service: Service) -> u32 {
        self.limits.get(&service).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 7).unwrap()
    }

    fn ledger_with(limit: u32) -> QuotaLedger {
        QuotaLedger::new(&QuotaConfig {
            telegram: limit,
            youtube: limit,
            twitter: limit,
            market: limit,
            scoring: limit,
        })
    }

    #[test]
    fn reservation_increments_before_the_call() {
        let ledger = ledger_with(3);
        match ledger.check_and_reserve(Service::Telegram, today()) {
            QuotaDecision::Allowed { used, limit } => {
                assert_eq!(used, 1);
                assert_eq!(limit, 3);
            }
            QuotaDecision::Blocked { .. } => panic!("first call must be allowed"),
        }
    }

    #[test]
    fn blocked_after_limit_and_sticky_for_the_day() {
        let ledger = ledger_with(2);
        assert!(ledger.check_and_reserve(Service::Twitter, today()).is_allowed());
        assert!(ledger.check_and_reserve(Service::Twitter, today()).is_allowed());

        // Every subsequent check for the date is blocked
        for _ in 0..5 {
            assert!(!ledger.check_and_reserve(Service::Twitter, today()).is_allowed());
        }
        assert!(ledger.is_blocked(Service::Twitter, today()));
    }

    #[test]
    fn other_services_unaffected_by_a_blocked_one() {
        let ledger = ledger_with(1);
        assert!(ledger.check_and_reserve(Service::Twitter, today()).is_allowed());
        assert!(!ledger.check_and_reserve(Service::Twitter, today()).is_allowed());
        assert!(ledger.check_and_reserve(Service::Telegram, today()).is_allowed());
    }

    #[test]
    fn date_rollover_resets_lazily() {
        let ledger = ledger_with(1);
        assert!(ledger.check_and_reserve(Service::Market, today()).is_allowed());
        assert!(!ledger.check_and_reserve(Service::Market, today()).is_allowed());

        let tomorrow = today().succ_opt().unwrap();
        assert!(ledger.check_and_reserve(Service::Market, tomorrow).is_allowed());
        assert!(!ledger.is_blocked(Service::Market, tomorrow));
    }

    #[test]
    fn failed_calls_are_not_refunded() {
        // The reservation stands regardless of what happens downstream:
        // two reservations exhaust a limit of 2 even if both calls failed.
        let ledger = ledger_with(2);
        ledger.check_and_reserve(Service::Scoring, today());
        ledger.check_and_reserve(Service::Scoring, today());
        assert!(ledger.is_blocked(Service::Scoring, today()));
    }

    #[test]
    fn summary_reports_remaining_and_any_blocked() {
        let ledger = ledger_with(2);
        ledger.check_and_reserve(Service::Youtube, today());

        let summary = ledger.usage_summary(today());
        assert!(!summary.any_blocked);
        let youtube = summary
            .services
            .iter()
            .find(|s| s.service == Service::Youtube)
            .unwrap();
        assert_eq!(youtube.used, 1);
        assert_eq!(youtube.remaining, 1);

        ledger.check_and_reserve(Service::Youtube, today());
        let summary = ledger.usage_summary(today());
        assert!(summary.any_blocked);
    }

    #[test]
    fn zero_limit_service_is_always_blocked() {
        let ledger = ledger_with(0);
        assert!(!ledger.check_and_reserve(Service::Telegram, today()).is_allowed());
        assert!(ledger.is_blocked(Service::Telegram, today()));
    }

    #[tokio::test]
    async fn concurrent_reservations_never_exceed_the_limit() {
        let ledger = Arc::new(ledger_with(50));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                let mut allowed = 0u32;
                for _ in 0..20 {
                    if ledger.check_and_reserve(Service::Market, today()).is_allowed() {
                        allowed += 1;
                    }
                }
                allowed
            }));
        }

        let mut total_allowed = 0;
        for handle in handles {
            total_allowed += handle.await.unwrap();
        }
        // 160 attempts against a budget of 50
        assert_eq!(total_allowed, 50);
        assert!(ledger.is_blocked(Service::Market, today()));
    }
}
