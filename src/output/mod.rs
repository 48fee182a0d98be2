//! Output registry.
//!
//! # Responsibilities
//! - Hold the pair of sinks (error, debug) every logger writes to
//! - Let tests and embedding applications redirect all traffic at runtime
//!
//! # Design Decisions
//! - The pair lives behind an `ArcSwap`: readers take a snapshot without
//!   locking and never observe a half-updated pair
//! - A pair is replaced wholesale, never mutated in place
//! - Loggers never cache a pair; each record loads the current one

pub mod sink;

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

pub use sink::{FailingSink, LogSink, MemorySink, Sink, StderrSink, StdoutSink, WriterSink};

/// The sinks for error-level and debug-level records.
#[derive(Clone)]
pub struct OutputPair {
    pub error: Sink,
    pub debug: Sink,
}

impl OutputPair {
    pub fn new(error: Sink, debug: Sink) -> Self {
        Self { error, debug }
    }
}

impl Default for OutputPair {
    /// Standard error for errors, standard output for debug.
    fn default() -> Self {
        Self::new(Arc::new(StderrSink), Arc::new(StdoutSink))
    }
}

impl fmt::Debug for OutputPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputPair").finish_non_exhaustive()
    }
}

/// Atomically swappable [`OutputPair`].
pub struct OutputRegistry {
    current: ArcSwap<OutputPair>,
}

impl OutputRegistry {
    /// Create a registry holding the default pair.
    pub fn new() -> Self {
        Self::with_outputs(OutputPair::default())
    }

    pub fn with_outputs(pair: OutputPair) -> Self {
        Self {
            current: ArcSwap::from_pointee(pair),
        }
    }

    /// Install a new pair, visible to every subsequent record.
    pub fn set_outputs(&self, error: Sink, debug: Sink) {
        self.current.store(Arc::new(OutputPair::new(error, debug)));
        tracing::debug!("log outputs replaced");
    }

    /// Restore standard error / standard output.
    pub fn reset_outputs(&self) {
        self.current.store(Arc::new(OutputPair::default()));
        tracing::debug!("log outputs reset to stderr/stdout");
    }

    /// Snapshot of the installed pair.
    pub fn get_outputs(&self) -> Arc<OutputPair> {
        self.current.load_full()
    }
}

impl Default for OutputRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OutputRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputRegistry").finish_non_exhaustive()
    }
}
