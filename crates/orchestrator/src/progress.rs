//! Ordered progress sink for a single run.
//!
//! Wraps the run's event channel and enforces the stream contract:
//! percentages never decrease, 100 appears only on the terminal event, and
//! exactly one terminal event is sent. A disconnected subscriber never
//! stalls the run — events are dropped and ingestion carries on.

use crowd_pulse_core::ProgressEvent;
use tokio::sync::mpsc;

pub struct ProgressSink {
    tx: mpsc::Sender<ProgressEvent>,
    last_percent: u8,
    terminated: bool,
}

impl ProgressSink {
    #[must_use]
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self {
            tx,
            last_percent: 0,
            terminated: false,
        }
    }

    /// Emits a non-terminal event. The percentage is clamped to the
    /// monotonic floor and capped at 99; only `finish`/`fail` reach 100.
    pub async fn emit(&mut self, step: &str, message: impl Into<String>, percent: u8) {
        if self.terminated {
            return;
        }
        let percent = percent.min(99).max(self.last_percent);
        self.last_percent = percent;
        self.send(ProgressEvent::new(step, message, percent)).await;
    }

    /// Emits the terminal success event at 100 and closes the stream.
    pub async fn finish(&mut self, message: impl Into<String>) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        self.send(ProgressEvent::new("done", message, 100).terminal())
            .await;
    }

    /// Emits the terminal failure event and closes the stream. The stream
    /// must always terminate, even when every step failed.
    pub async fn fail(&mut self, message: impl Into<String>) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        self.send(ProgressEvent::new("error", message, 100).terminal())
            .await;
    }

    async fn send(&self, event: ProgressEvent) {
        // Subscriber may have hung up; the run continues regardless
        if self.tx.send(event).await.is_err() {
            tracing::debug!("Progress subscriber disconnected, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn percent_is_monotonic_and_caps_below_100() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut sink = ProgressSink::new(tx);

        sink.emit("telegram", "scraping", 10).await;
        sink.emit("youtube", "scraping", 5).await; // would regress
        sink.emit("market", "fetching", 120).await; // would overflow
        sink.finish("complete").await;

        let percents: Vec<u8> = [
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
        ]
        .iter()
        .map(|e| e.progress)
        .collect();

        assert_eq!(percents, vec![10, 10, 99, 100]);
    }

    #[tokio::test]
    async fn only_terminal_event_reaches_100() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut sink = ProgressSink::new(tx);

        sink.emit("signals", "computing", 100).await;
        sink.finish("complete").await;

        let first = rx.recv().await.unwrap();
        let last = rx.recv().await.unwrap();
        assert_eq!(first.progress, 99);
        assert!(!first.done);
        assert_eq!(last.progress, 100);
        assert!(last.done);
    }

    #[tokio::test]
    async fn exactly_one_terminal_event() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut sink = ProgressSink::new(tx);

        sink.finish("complete").await;
        sink.fail("too late").await;
        sink.emit("telegram", "too late", 10).await;
        drop(sink);

        let first = rx.recv().await.unwrap();
        assert!(first.done);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn disconnected_subscriber_does_not_block() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut sink = ProgressSink::new(tx);

        // Must not hang or panic
        sink.emit("telegram", "scraping", 10).await;
        sink.finish("complete").await;
    }

    #[tokio::test]
    async fn failure_terminates_the_stream() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut sink = ProgressSink::new(tx);

        sink.fail("every step failed").await;
        let event = rx.recv().await.unwrap();
        assert!(event.done);
        assert_eq!(event.step, "error");
    }
}
