//! Per-subsystem loggers.
//!
//! # Call Flow
//! ```text
//! debug / trace        → debug sink
//! error / errorf       → error sink → transparent reporters
//! reported_error       → error sink → transparent + explicit reporters
//! fatal / fatalf       → error sink → exit(1)
//! ```
//!
//! # Design Decisions
//! - A logger is immutable once built: trace and stack-dump settings are
//!   resolved at construction and never re-read
//! - Sinks are looked up on every record, so an output swap reaches every
//!   logger on its next call
//! - Public entry points are `#[track_caller]`; the call site is captured
//!   once and passed down explicitly

pub mod error_writer;

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::config::LogConfig;
use crate::context;
use crate::error::{LogError, SharedError};
use crate::facility::Facility;
use crate::format::{self, template, Arg, Header, Loggable, Severity};
use crate::trace_stream::TraceWriter;

pub use error_writer::ErrorWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Error,
    Debug,
}

/// Build a logger for subsystem `name`, configured from the environment
/// and writing through the global facility.
pub fn logger_for(name: &str) -> Logger {
    Logger::builder(name).build()
}

/// A logger for one subsystem.
///
/// Cheap to clone; clones share configuration and facility.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    prefix: Arc<str>,
    trace_on: bool,
    print_stack: bool,
    facility: Arc<Facility>,
}

/// Builder for [`Logger`].
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    config: Option<LogConfig>,
    facility: Option<Arc<Facility>>,
}

impl LoggerBuilder {
    /// Use `config` instead of reading the environment.
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Write through `facility` instead of the global one.
    pub fn facility(mut self, facility: Arc<Facility>) -> Self {
        self.facility = Some(facility);
        self
    }

    pub fn build(self) -> Logger {
        let config = self.config.unwrap_or_else(LogConfig::from_env);
        let facility = self.facility.unwrap_or_else(Facility::global);
        let trace_on = config.trace_enabled_for(&self.name);

        tracing::debug!(
            subsystem = %self.name,
            trace = trace_on,
            print_stack = config.print_stack,
            "logger created"
        );

        Logger {
            prefix: format!("{}: ", self.name).into(),
            name: self.name.into(),
            trace_on,
            print_stack: config.print_stack,
            facility,
        }
    }
}

impl Logger {
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            config: None,
            facility: None,
        }
    }

    /// Subsystem name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_trace_enabled(&self) -> bool {
        self.trace_on
    }

    pub fn facility(&self) -> &Arc<Facility> {
        &self.facility
    }

    /// Log `value` to the debug sink.
    #[track_caller]
    pub fn debug<V: Loggable + ?Sized>(&self, value: &V) {
        self.log_value(Target::Debug, Severity::Debug, Location::caller(), value);
    }

    /// Log a template to the debug sink.
    #[track_caller]
    pub fn debugf(&self, template: &str, args: &[Arg<'_>]) {
        self.log_template(Target::Debug, Severity::Debug, Location::caller(), template, args);
    }

    /// Log `value` to the error sink and hand it to transparent reporters.
    ///
    /// Values that are not errors are wrapped in [`LogError::Message`];
    /// a [`SharedError`] is returned unchanged.
    #[track_caller]
    pub fn error<V: Loggable + ?Sized>(&self, value: &V) -> SharedError {
        self.error_at(Location::caller(), false, format::coerce_error(value))
    }

    /// Like [`Logger::error`], but explicit reporters are notified too.
    #[track_caller]
    pub fn reported_error<V: Loggable + ?Sized>(&self, err: &V) -> SharedError {
        self.error_at(Location::caller(), true, format::coerce_error(err))
    }

    /// Log a template to the error sink.
    ///
    /// Returns the first argument that is an error, or a new error holding
    /// the formatted message when there is none. Only transparent reporters
    /// are notified.
    #[track_caller]
    pub fn errorf(&self, template: &str, args: &[Arg<'_>]) -> SharedError {
        let location = Location::caller();
        let mut buf = self.facility.buffers().get();

        let err = match args.iter().find_map(|arg| arg.to_error()) {
            Some(err) => {
                let values = context::as_map(&*err, false);
                let header = self.header(Severity::Error, location);
                format::format_template(&mut buf, &header, template, args, &values);
                self.write(Target::Error, &buf);
                err
            }
            None => {
                let err = LogError::Message(template::format(template, args)).shared();
                let header = self.header(Severity::Error, location);
                format::format_value(&mut buf, &header, &err);
                self.write(Target::Error, &buf);
                err
            }
        };
        self.facility.reporters().report(false, err, &buf)
    }

    /// Log `value` to the error sink and exit with status 1.
    ///
    /// Reporters are not notified.
    #[track_caller]
    pub fn fatal<V: Loggable + ?Sized>(&self, value: &V) -> ! {
        self.log_value(Target::Error, Severity::Fatal, Location::caller(), value);
        std::process::exit(1)
    }

    /// Log a template to the error sink and exit with status 1.
    #[track_caller]
    pub fn fatalf(&self, template: &str, args: &[Arg<'_>]) -> ! {
        self.log_template(Target::Error, Severity::Fatal, Location::caller(), template, args);
        std::process::exit(1)
    }

    /// Log `value` to the debug sink if tracing is enabled for this logger.
    #[track_caller]
    pub fn trace<V: Loggable + ?Sized>(&self, value: &V) {
        if self.trace_on {
            self.log_value(Target::Debug, Severity::Trace, Location::caller(), value);
        }
    }

    /// Log a template to the debug sink if tracing is enabled.
    #[track_caller]
    pub fn tracef(&self, template: &str, args: &[Arg<'_>]) {
        if self.trace_on {
            self.log_template(Target::Debug, Severity::Trace, Location::caller(), template, args);
        }
    }

    /// A stream whose lines are logged as TRACE records.
    ///
    /// When tracing is disabled the stream discards everything written.
    pub fn trace_out(&self) -> TraceWriter {
        TraceWriter::new(self.clone())
    }

    /// A [`std::io::Write`] that logs every write as one ERROR record.
    pub fn error_writer(&self) -> ErrorWriter {
        ErrorWriter::new(self.clone())
    }

    pub(crate) fn trace_at<V: Loggable + ?Sized>(&self, location: &Location<'_>, value: &V) {
        if self.trace_on {
            self.log_value(Target::Debug, Severity::Trace, location, value);
        }
    }

    pub(crate) fn tracef_at(&self, location: &Location<'_>, template: &str, args: &[Arg<'_>]) {
        if self.trace_on {
            self.log_template(Target::Debug, Severity::Trace, location, template, args);
        }
    }

    pub(crate) fn error_record_at<V: Loggable + ?Sized>(&self, location: &Location<'_>, value: &V) {
        self.log_value(Target::Error, Severity::Error, location, value);
    }

    fn error_at(&self, location: &Location<'_>, requested: bool, err: SharedError) -> SharedError {
        let mut buf = self.facility.buffers().get();
        let header = self.header(Severity::Error, location);
        format::format_value(&mut buf, &header, &err);
        self.write(Target::Error, &buf);
        self.facility.reporters().report(requested, err, &buf)
    }

    fn log_value<V: Loggable + ?Sized>(
        &self,
        target: Target,
        severity: Severity,
        location: &Location<'_>,
        value: &V,
    ) {
        let mut buf = self.facility.buffers().get();
        let header = self.header(severity, location);
        format::format_value(&mut buf, &header, value);
        self.write(target, &buf);
    }

    fn log_template(
        &self,
        target: Target,
        severity: Severity,
        location: &Location<'_>,
        template: &str,
        args: &[Arg<'_>],
    ) {
        let mut buf = self.facility.buffers().get();
        let header = self.header(severity, location);
        format::format_template(&mut buf, &header, template, args, &Default::default());
        self.write(target, &buf);
    }

    fn header<'a>(&'a self, severity: Severity, location: &'a Location<'a>) -> Header<'a> {
        Header {
            severity,
            prefix: &self.prefix,
            location,
        }
    }

    fn write(&self, target: Target, record: &str) {
        let outputs = self.facility.outputs().get_outputs();
        let sink = match target {
            Target::Error => &outputs.error,
            Target::Debug => &outputs.debug,
        };
        format::emit(sink.as_ref(), outputs.error.as_ref(), record);
        if self.print_stack {
            format::dump_stack(outputs.error.as_ref());
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("trace_on", &self.trace_on)
            .field("print_stack", &self.print_stack)
            .finish_non_exhaustive()
    }
}
