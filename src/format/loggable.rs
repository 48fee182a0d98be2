//! Values that can be logged.
//!
//! A value describes itself through optional capabilities instead of being
//! inspected at runtime: a body, an optional multi-line printer, an optional
//! error view for context lookup and an optional error coercion.

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use serde_json::Value;

use crate::context::{self, ContextError, ContextMap};
use crate::error::{LogError, SharedError};

/// Writes one line into the buffer and returns true if more lines follow.
///
/// The printer does not write line terminators or headers; the formatter
/// adds both.
pub type LinePrinter<'a> = Box<dyn FnMut(&mut String) -> bool + 'a>;

/// A value accepted by the logging API.
pub trait Loggable {
    /// Append the single-line form of the value.
    fn write_body(&self, buf: &mut String);

    /// A line printer, if the value renders over several lines.
    fn multi_line(&self) -> Option<LinePrinter<'_>> {
        None
    }

    /// The value viewed as an error, used to look up its context.
    fn as_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }

    /// The value as a shareable error.
    ///
    /// `SharedError` returns a clone of itself, so error-level calls hand
    /// the caller's error back unchanged.
    fn to_error(&self) -> Option<SharedError> {
        None
    }

    /// Context shown in the record annotation. Globals are never included.
    fn context(&self) -> ContextMap {
        self.as_error()
            .map(|err| context::as_map(err, false))
            .unwrap_or_default()
    }
}

/// Coerce `value` into an error, wrapping non-errors in [`LogError::Message`].
pub fn coerce_error<V: Loggable + ?Sized>(value: &V) -> SharedError {
    match value.to_error() {
        Some(err) => err,
        None => {
            let mut body = String::new();
            value.write_body(&mut body);
            LogError::Message(body).shared()
        }
    }
}

impl<T: Loggable + ?Sized> Loggable for &T {
    fn write_body(&self, buf: &mut String) {
        (**self).write_body(buf)
    }

    fn multi_line(&self) -> Option<LinePrinter<'_>> {
        (**self).multi_line()
    }

    fn as_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        (**self).as_error()
    }

    fn to_error(&self) -> Option<SharedError> {
        (**self).to_error()
    }

    fn context(&self) -> ContextMap {
        (**self).context()
    }
}

macro_rules! display_loggable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Loggable for $ty {
                fn write_body(&self, buf: &mut String) {
                    let _ = write!(buf, "{}", self);
                }
            }
        )*
    };
}

display_loggable!(
    str, String, char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, f32, f64, Value,
);

impl Loggable for fmt::Arguments<'_> {
    fn write_body(&self, buf: &mut String) {
        let _ = buf.write_fmt(*self);
    }
}

impl Loggable for () {
    fn write_body(&self, _buf: &mut String) {}
}

impl<T: Loggable> Loggable for Option<T> {
    fn write_body(&self, buf: &mut String) {
        if let Some(v) = self {
            v.write_body(buf);
        }
    }

    fn multi_line(&self) -> Option<LinePrinter<'_>> {
        self.as_ref().and_then(Loggable::multi_line)
    }

    fn as_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.as_ref().and_then(Loggable::as_error)
    }

    fn to_error(&self) -> Option<SharedError> {
        self.as_ref().and_then(Loggable::to_error)
    }

    fn context(&self) -> ContextMap {
        self.as_ref().map(Loggable::context).unwrap_or_default()
    }
}

impl Loggable for SharedError {
    fn write_body(&self, buf: &mut String) {
        let _ = write!(buf, "{}", self);
    }

    fn as_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let err: &(dyn std::error::Error + 'static) = &**self;
        Some(err)
    }

    fn to_error(&self) -> Option<SharedError> {
        Some(Arc::clone(self))
    }
}

impl Loggable for LogError {
    fn write_body(&self, buf: &mut String) {
        let _ = write!(buf, "{}", self);
    }

    fn as_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self)
    }

    fn to_error(&self) -> Option<SharedError> {
        Some(self.clone().shared())
    }
}

impl Loggable for ContextError {
    fn write_body(&self, buf: &mut String) {
        let _ = write!(buf, "{}", self);
    }

    fn as_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self)
    }

    fn to_error(&self) -> Option<SharedError> {
        Some(self.clone().shared())
    }
}

impl Loggable for std::io::Error {
    fn write_body(&self, buf: &mut String) {
        let _ = write!(buf, "{}", self);
    }

    fn as_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self)
    }

    /// `io::Error` is not `Clone`, so reporters receive a copy: the OS error
    /// code or the kind and message survive, the source chain does not. Log
    /// a [`SharedError`] instead when identity matters.
    fn to_error(&self) -> Option<SharedError> {
        let copy = match self.raw_os_error() {
            Some(code) => std::io::Error::from_raw_os_error(code),
            None => std::io::Error::new(self.kind(), self.to_string()),
        };
        Some(Arc::new(copy))
    }
}

/// A value printed over several lines, each with its own record header.
///
/// Context added with [`MultiLine::with`] is annotated on the first line
/// only.
#[derive(Debug, Clone, Default)]
pub struct MultiLine {
    lines: Vec<String>,
    context: ContextMap,
}

impl MultiLine {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            context: ContextMap::new(),
        }
    }

    /// Split `text` on line breaks.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

impl Loggable for MultiLine {
    fn write_body(&self, buf: &mut String) {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                buf.push('\n');
            }
            buf.push_str(line);
        }
    }

    fn multi_line(&self) -> Option<LinePrinter<'_>> {
        let mut lines = self.lines.iter().peekable();
        Some(Box::new(move |buf: &mut String| {
            if let Some(line) = lines.next() {
                buf.push_str(line);
            }
            lines.peek().is_some()
        }))
    }

    fn context(&self) -> ContextMap {
        self.context.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body<V: Loggable + ?Sized>(value: &V) -> String {
        let mut buf = String::new();
        value.write_body(&mut buf);
        buf
    }

    #[test]
    fn test_display_bodies() {
        assert_eq!(body("hello"), "hello");
        assert_eq!(body(&42u32), "42");
        assert_eq!(body(&format_args!("a{}", 1)), "a1");
        assert_eq!(body(&None::<&str>), "");
        assert_eq!(body(&()), "");
    }

    #[test]
    fn test_coerce_keeps_shared_identity() {
        let err: SharedError = LogError::Message("boom".into()).shared();
        let coerced = coerce_error(&err);
        assert!(Arc::ptr_eq(&err, &coerced));
    }

    #[test]
    fn test_coerce_wraps_plain_values() {
        let coerced = coerce_error("not an error");
        assert_eq!(coerced.to_string(), "not an error");
        assert!(coerced.downcast_ref::<LogError>().is_some());
    }

    #[test]
    fn test_io_error_keeps_os_code() {
        let err = std::io::Error::from_raw_os_error(2);
        let coerced = coerce_error(&err);
        let io = coerced.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.raw_os_error(), Some(2));
        assert_eq!(io.kind(), err.kind());

        let custom = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let coerced = coerce_error(&custom);
        let io = coerced.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe);
        assert_eq!(io.to_string(), "gone");
    }

    #[test]
    fn test_context_from_error() {
        let err = ContextError::wrap(LogError::Message("boom".into())).with("k", "v");
        assert_eq!(err.context()["k"], Value::from("v"));
        assert!("plain".context().is_empty());
    }

    #[test]
    fn test_multi_line_printer() {
        let ml = MultiLine::new(["a", "b", "c"]);
        let mut printer = ml.multi_line().unwrap();
        let mut out = Vec::new();
        loop {
            let mut buf = String::new();
            let more = printer(&mut buf);
            out.push(buf);
            if !more {
                break;
            }
        }
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_multi_line_prints_one_empty_line() {
        let ml = MultiLine::default();
        let mut printer = ml.multi_line().unwrap();
        let mut buf = String::new();
        assert!(!printer(&mut buf));
        assert!(buf.is_empty());
    }
}
