//! Shared logging state.
//!
//! A [`Facility`] bundles the output registry, the reporter registry and the
//! record buffer pool. Loggers hold an `Arc<Facility>`; the global facility
//! backs [`crate::logger_for`] and the free functions at the crate root,
//! while tests and embedding applications can build isolated ones.

use std::sync::{Arc, LazyLock};

use crate::format::BufferPool;
use crate::output::{OutputPair, OutputRegistry};
use crate::reporting::ReporterRegistry;

static GLOBAL: LazyLock<Arc<Facility>> = LazyLock::new(|| Arc::new(Facility::new()));

/// Outputs, reporters and buffers shared by a set of loggers.
#[derive(Debug, Default)]
pub struct Facility {
    outputs: OutputRegistry,
    reporters: ReporterRegistry,
    buffers: BufferPool,
}

impl Facility {
    /// A facility writing to stderr/stdout with no reporters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A facility writing to `outputs`.
    pub fn with_outputs(outputs: OutputPair) -> Self {
        Self {
            outputs: OutputRegistry::with_outputs(outputs),
            ..Self::default()
        }
    }

    /// The process-wide facility.
    pub fn global() -> Arc<Facility> {
        Arc::clone(&GLOBAL)
    }

    pub fn outputs(&self) -> &OutputRegistry {
        &self.outputs
    }

    pub fn reporters(&self) -> &ReporterRegistry {
        &self.reporters
    }

    pub fn buffers(&self) -> &BufferPool {
        &self.buffers
    }
}
