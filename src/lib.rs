//! Per-subsystem leveled logging with contextual error reporting.
//!
//! ```text
//!   log call ──▶ format (header, body, context) ──▶ redaction ──▶ sink
//!                                                                   │
//!                                   error paths ◀───────────────────┘
//!                                        │
//!                                        ▼
//!                           reporters (transparent / explicit)
//!
//!   TraceWriter ──▶ pump task ──▶ Logger::trace path (one record per line)
//! ```
//!
//! ```no_run
//! use sublog::{errorf, logger_for, ContextError, LogError};
//!
//! let log = logger_for("db");
//! log.debug("connecting");
//! let err = ContextError::wrap(LogError::Message("timeout".into()))
//!     .with("attempt", 3)
//!     .shared();
//! let returned = errorf!(log, "query failed: {}", err);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod facility;
pub mod format;
pub mod logger;
pub mod output;
pub mod redaction;
pub mod reporting;
pub mod trace_stream;

use std::sync::Arc;

pub use config::{LogConfig, TraceSetting};
pub use context::{ContextError, ContextMap};
pub use error::{LogError, SharedError};
pub use facility::Facility;
pub use format::{Arg, Loggable, MultiLine, Severity};
pub use logger::{logger_for, ErrorWriter, Logger};
pub use output::{LogSink, MemorySink, OutputPair, Sink};
pub use reporting::{ErrorReport, Reporter};
pub use trace_stream::TraceWriter;

/// Install new sinks on the global facility.
pub fn set_outputs(error: Sink, debug: Sink) {
    Facility::global().outputs().set_outputs(error, debug);
}

/// Restore stderr/stdout on the global facility.
pub fn reset_outputs() {
    Facility::global().outputs().reset_outputs();
}

/// Sinks currently installed on the global facility.
pub fn get_outputs() -> Arc<OutputPair> {
    Facility::global().outputs().get_outputs()
}

/// Register a reporter on the global facility.
pub fn register_reporter(reporter: Reporter, explicit: bool) {
    Facility::global().reporters().register_reporter(reporter, explicit);
}

/// `log.debugf(template, &[args..])` without spelling out the slice.
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.debugf($template, &[$(&$arg as &dyn $crate::Loggable),*])
    };
}

/// `log.errorf(template, &[args..])`; evaluates to the returned error.
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.errorf($template, &[$(&$arg as &dyn $crate::Loggable),*])
    };
}

/// `log.tracef(template, &[args..])`; a no-op unless tracing is enabled.
#[macro_export]
macro_rules! tracef {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.tracef($template, &[$(&$arg as &dyn $crate::Loggable),*])
    };
}

/// `log.fatalf(template, &[args..])`; never returns.
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.fatalf($template, &[$(&$arg as &dyn $crate::Loggable),*])
    };
}
