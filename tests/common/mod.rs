//! Shared helpers for integration tests.

use std::sync::{Arc, Mutex};

use sublog::{ContextMap, Facility, LogConfig, Logger, MemorySink, OutputPair, Reporter, SharedError};

/// A facility writing into two memory sinks.
pub struct Harness {
    pub facility: Arc<Facility>,
    pub errors: MemorySink,
    pub debug: MemorySink,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        let errors = MemorySink::new();
        let debug = MemorySink::new();
        let facility = Arc::new(Facility::with_outputs(OutputPair::new(
            Arc::new(errors.clone()),
            Arc::new(debug.clone()),
        )));
        Self {
            facility,
            errors,
            debug,
        }
    }

    pub fn logger(&self, name: &str) -> Logger {
        self.logger_with(name, LogConfig::default())
    }

    pub fn logger_with(&self, name: &str, config: LogConfig) -> Logger {
        Logger::builder(name)
            .config(config)
            .facility(self.facility.clone())
            .build()
    }
}

/// One call received by a [`Recorder`].
#[derive(Clone)]
pub struct Received {
    pub error: SharedError,
    pub text: String,
    pub context: ContextMap,
}

/// A reporter remembering every call.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Received>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reporter(&self) -> Reporter {
        let calls = self.calls.clone();
        Arc::new(move |err: &SharedError, text: &str, ctx: &ContextMap| {
            calls.lock().unwrap().push(Received {
                error: err.clone(),
                text: text.to_string(),
                context: ctx.clone(),
            });
        })
    }

    pub fn calls(&self) -> Vec<Received> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}
