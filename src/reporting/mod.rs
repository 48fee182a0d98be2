//! Error reporter registry.
//!
//! # Data Flow
//! ```text
//! Logger::error / errorf         → report(false, ..) → transparent reporters
//! Logger::reported_error         → report(true, ..)  → transparent, then explicit
//! Logger::fatal / fatalf         → (no reporters)
//! ```
//!
//! # Design Decisions
//! - Reporters run synchronously on the logging path and must return
//!   quickly; [`channel`] builds one that buffers and drops on saturation
//! - Registration takes the write lock, reporting the read lock, so
//!   concurrent reports never wait on each other
//! - Reporters are never removed
//! - A panicking reporter is not caught here: reporters are trusted code

pub mod channel;

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::context::{self, ContextMap};
use crate::error::SharedError;
use crate::redaction;

pub use channel::{channel, ErrorReport, ReportReceiver};

/// Receives every reported error with its redacted record text and its
/// context (globals included).
pub type Reporter = Arc<dyn Fn(&SharedError, &str, &ContextMap) + Send + Sync>;

#[derive(Default)]
struct Reporters {
    transparent: Vec<Reporter>,
    explicit: Vec<Reporter>,
}

/// Process-wide lists of reporters.
#[derive(Default)]
pub struct ReporterRegistry {
    inner: RwLock<Reporters>,
}

impl ReporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `reporter`.
    ///
    /// Explicit reporters only see errors logged through
    /// `Logger::reported_error`; transparent reporters see every error.
    pub fn register_reporter(&self, reporter: Reporter, explicit: bool) {
        let mut reporters = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if explicit {
            reporters.explicit.push(reporter);
        } else {
            reporters.transparent.push(reporter);
        }
        tracing::debug!(
            explicit,
            transparent = reporters.transparent.len(),
            explicit_total = reporters.explicit.len(),
            "error reporter registered"
        );
    }

    /// Hand `err` to the reporters and return it.
    ///
    /// Transparent reporters always run; explicit reporters run only when
    /// `requested` is true. Each group runs in registration order.
    pub fn report(&self, requested: bool, err: SharedError, text: &str) -> SharedError {
        let reporters = self.inner.read().unwrap_or_else(|e| e.into_inner());
        if reporters.transparent.is_empty() && (!requested || reporters.explicit.is_empty()) {
            return err;
        }

        let text = redaction::clean(text);
        let values = context::as_map(&*err, true);
        for reporter in &reporters.transparent {
            reporter(&err, &text, &values);
        }
        if requested {
            for reporter in &reporters.explicit {
                reporter(&err, &text, &values);
            }
        }
        err
    }

    /// Number of (transparent, explicit) reporters.
    pub fn counts(&self) -> (usize, usize) {
        let reporters = self.inner.read().unwrap_or_else(|e| e.into_inner());
        (reporters.transparent.len(), reporters.explicit.len())
    }
}

impl fmt::Debug for ReporterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (transparent, explicit) = self.counts();
        f.debug_struct("ReporterRegistry")
            .field("transparent", &transparent)
            .field("explicit", &explicit)
            .finish()
    }
}
