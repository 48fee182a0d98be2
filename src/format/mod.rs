//! Line formatter.
//!
//! # Record Layout
//! ```text
//! SEVERITY prefix: file:line message [k1=v1 k2=v2]\n
//! ```
//!
//! # Responsibilities
//! - Build the record header from severity, logger prefix and call site
//! - Render single values, multi-line values and templates
//! - Append the sorted context annotation
//! - Redact hidden annotations before anything reaches a sink
//! - Swallow sink failures behind a diagnostic line
//!
//! # Design Decisions
//! - Call sites come from `#[track_caller]`, so there are no frame counts
//!   to keep in sync and no shared stack scratch space
//! - Formatting never fails the caller; only sinks can fail and those
//!   failures are reported, not returned

pub mod buffer_pool;
pub mod loggable;
pub mod template;

use std::backtrace::Backtrace;
use std::fmt;
use std::fmt::Write as _;
use std::panic::Location;
use std::path::Path;

use crate::context::{self, ContextMap};
use crate::output::LogSink;
use crate::redaction;

pub use buffer_pool::{BufferPool, PooledBuffer};
pub use loggable::{coerce_error, LinePrinter, Loggable, MultiLine};
pub use template::Arg;

/// Record severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Debug,
    Error,
    Fatal,
    Trace,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
            Severity::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything written before the message body.
#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    pub severity: Severity,
    /// Logger prefix including its trailing `": "`.
    pub prefix: &'a str,
    pub location: &'a Location<'a>,
}

impl Header<'_> {
    pub fn write(&self, buf: &mut String) {
        buf.push_str(self.severity.as_str());
        buf.push(' ');
        buf.push_str(self.prefix);
        buf.push_str(basename(self.location.file()));
        let _ = write!(buf, ":{} ", self.location.line());
    }
}

fn basename(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}

/// Append ` [k1=v1 k2=v2]`, or nothing for an empty map.
pub fn write_context(buf: &mut String, values: &ContextMap) {
    if values.is_empty() {
        return;
    }
    buf.push_str(" [");
    for (i, (key, value)) in values.iter().enumerate() {
        if i > 0 {
            buf.push(' ');
        }
        buf.push_str(key);
        buf.push('=');
        context::write_value(buf, value);
    }
    buf.push(']');
}

/// Append the record for a single value.
///
/// Multi-line values repeat the header on every line; their context goes
/// on the first line only.
pub fn format_value<V: Loggable + ?Sized>(buf: &mut String, header: &Header<'_>, value: &V) {
    let values = value.context();
    match value.multi_line() {
        Some(mut printer) => {
            let mut first = true;
            loop {
                header.write(buf);
                let more = printer(buf);
                if first {
                    write_context(buf, &values);
                    first = false;
                }
                buf.push('\n');
                if !more {
                    break;
                }
            }
        }
        None => {
            header.write(buf);
            value.write_body(buf);
            write_context(buf, &values);
            buf.push('\n');
        }
    }
}

/// Append the record for a template and its arguments.
pub fn format_template(
    buf: &mut String,
    header: &Header<'_>,
    template: &str,
    args: &[Arg<'_>],
    values: &ContextMap,
) {
    header.write(buf);
    template::format_into(buf, template, args);
    write_context(buf, values);
    buf.push('\n');
}

/// Redact `record` and write it to `sink`.
///
/// A failed write is reported on `error_sink` and otherwise ignored.
pub fn emit(sink: &dyn LogSink, error_sink: &dyn LogSink, record: &str) {
    let cleaned = redaction::clean(record);
    if let Err(err) = sink.write_record(cleaned.as_bytes()) {
        error_on_logging(error_sink, &err);
    }
}

/// Write the current call stack to `error_sink`.
pub fn dump_stack(error_sink: &dyn LogSink) {
    let trace = Backtrace::force_capture();
    let mut text = String::new();
    let _ = writeln!(text, "{}", trace);
    if let Err(err) = error_sink.write_record(text.as_bytes()) {
        error_on_logging(error_sink, &err);
    }
}

fn error_on_logging(error_sink: &dyn LogSink, err: &std::io::Error) {
    tracing::warn!(error = %err, "log sink write failed");
    let line = format!("Unable to log: {}\n", err);
    // Best effort: the error sink may be the one failing.
    let _ = error_sink.write_record(line.as_bytes());
}
