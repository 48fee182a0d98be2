//! Buffered reporter.
//!
//! Reports are pushed into a bounded queue without waiting; when the queue
//! is full (or the receiver is gone) the report is dropped and counted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::Reporter;
use crate::context::ContextMap;
use crate::error::SharedError;

/// One reported error, as received by the consumer side.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub error: SharedError,
    /// Redacted record text.
    pub text: String,
    /// Error context with globals merged in.
    pub context: ContextMap,
}

/// Consumer side of [`channel`].
#[derive(Debug)]
pub struct ReportReceiver {
    rx: mpsc::Receiver<ErrorReport>,
    dropped: Arc<AtomicU64>,
}

impl ReportReceiver {
    /// Wait for the next report. Returns `None` once every reporter handle
    /// is gone and the queue is drained.
    pub async fn recv(&mut self) -> Option<ErrorReport> {
        self.rx.recv().await
    }

    /// Take a queued report without waiting.
    pub fn try_recv(&mut self) -> Option<ErrorReport> {
        self.rx.try_recv().ok()
    }

    /// Reports discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Build a reporter that queues up to `capacity` reports.
///
/// The reporter never blocks the logging path.
pub fn channel(capacity: usize) -> (Reporter, ReportReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    let counter = dropped.clone();

    let reporter: Reporter = Arc::new(move |err: &SharedError, text: &str, ctx: &ContextMap| {
        let report = ErrorReport {
            error: err.clone(),
            text: text.to_owned(),
            context: ctx.clone(),
        };
        if tx.try_send(report).is_err() {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    });

    (reporter, ReportReceiver { rx, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;

    #[test]
    fn test_queues_reports() {
        let (reporter, mut rx) = channel(4);
        let err = LogError::Message("boom".into()).shared();
        reporter(&err, "text", &ContextMap::new());

        let report = rx.try_recv().unwrap();
        assert!(Arc::ptr_eq(&report.error, &err));
        assert_eq!(report.text, "text");
        assert_eq!(rx.dropped(), 0);
    }

    #[test]
    fn test_drops_when_full() {
        let (reporter, mut rx) = channel(2);
        let err = LogError::Message("boom".into()).shared();
        for _ in 0..5 {
            reporter(&err, "text", &ContextMap::new());
        }
        assert_eq!(rx.dropped(), 3);
        assert!(rx.try_recv().is_some());
        assert!(rx.try_recv().is_some());
        assert!(rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_recv_ends_when_reporter_dropped() {
        let (reporter, mut rx) = channel(1);
        let err = LogError::Message("boom".into()).shared();
        reporter(&err, "text", &ContextMap::new());
        drop(reporter);

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }
}
