//! Structured context attached to errors.
//!
//! # Data Flow
//! ```text
//! caller error
//!     → ContextError::wrap(err).with("key", value)
//!     → logged / returned as SharedError
//!
//! formatter  → as_map(err, false)  (record annotation, no globals)
//! reporters  → as_map(err, true)   (globals merged underneath)
//! ```
//!
//! # Design Decisions
//! - Keys are ordered (`BTreeMap`), so every consumer sees the same order
//! - Outer context wins over inner context, error context over globals
//! - Globals live in a concurrent map; writers never block readers for long

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use serde_json::Value;

use crate::error::SharedError;

/// Ordered context key/value pairs.
pub type ContextMap = BTreeMap<String, Value>;

static GLOBALS: LazyLock<DashMap<String, Value>> = LazyLock::new(DashMap::new);

/// An error carrying key/value context.
///
/// Display and `source()` are transparent: the wrapper only adds context.
#[derive(Debug, Clone)]
pub struct ContextError {
    inner: SharedError,
    values: ContextMap,
}

impl ContextError {
    /// Attach an empty context to `err`.
    pub fn wrap<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::from_shared(Arc::new(err))
    }

    /// Attach an empty context to an already shared error.
    pub fn from_shared(inner: SharedError) -> Self {
        Self {
            inner,
            values: ContextMap::new(),
        }
    }

    /// Add one key/value pair, replacing any previous value for `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// The wrapped error.
    pub fn inner(&self) -> &SharedError {
        &self.inner
    }

    /// Context attached directly to this error.
    pub fn values(&self) -> &ContextMap {
        &self.values
    }

    /// Convert into a [`SharedError`].
    pub fn shared(self) -> SharedError {
        Arc::new(self)
    }
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl std::error::Error for ContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Set a process-wide context value included in every report.
pub fn set_global(key: impl Into<String>, value: impl Into<Value>) {
    GLOBALS.insert(key.into(), value.into());
}

/// Remove a process-wide context value.
pub fn remove_global(key: &str) -> Option<Value> {
    GLOBALS.remove(key).map(|(_, v)| v)
}

/// Collect the context of `err` and, optionally, the global context.
pub fn as_map(err: &(dyn std::error::Error + 'static), include_globals: bool) -> ContextMap {
    let mut map = ContextMap::new();

    let mut current = Some(err);
    while let Some(e) = current {
        current = match e.downcast_ref::<ContextError>() {
            Some(ctx) => {
                for (k, v) in &ctx.values {
                    map.entry(k.clone()).or_insert_with(|| v.clone());
                }
                let inner: &(dyn std::error::Error + 'static) = &*ctx.inner;
                Some(inner)
            }
            None => e.source(),
        };
    }

    if include_globals {
        for entry in GLOBALS.iter() {
            map.entry(entry.key().clone())
                .or_insert_with(|| entry.value().clone());
        }
    }
    map
}

/// Append `value` the way it appears in a record: strings unquoted,
/// everything else in its JSON form.
pub fn write_value(buf: &mut String, value: &Value) {
    match value {
        Value::String(s) => buf.push_str(s),
        other => {
            let _ = write!(buf, "{}", other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;

    #[test]
    fn test_plain_error_has_no_context() {
        let err = LogError::Message("boom".into());
        assert!(as_map(&err, false).is_empty());
    }

    #[test]
    fn test_context_is_sorted() {
        let err = ContextError::wrap(LogError::Message("boom".into()))
            .with("zeta", 1)
            .with("alpha", "a")
            .with("mid", true);
        let keys: Vec<_> = as_map(&err, false).into_keys().collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_outer_context_wins() {
        let inner = ContextError::wrap(LogError::Message("boom".into()))
            .with("op", "inner")
            .with("only_inner", 1);
        let outer = ContextError::wrap(inner).with("op", "outer");
        let map = as_map(&outer, false);
        assert_eq!(map["op"], Value::from("outer"));
        assert_eq!(map["only_inner"], Value::from(1));
        assert_eq!(outer.to_string(), "boom");
    }

    #[test]
    fn test_globals_only_when_requested() {
        set_global("context_test_global", "g");
        let err = ContextError::wrap(LogError::Message("boom".into())).with("k", "v");
        assert!(!as_map(&err, false).contains_key("context_test_global"));
        assert_eq!(as_map(&err, true)["context_test_global"], Value::from("g"));
        remove_global("context_test_global");
    }

    #[test]
    fn test_error_context_overrides_global() {
        set_global("context_test_shadowed", "global");
        let err = ContextError::wrap(LogError::Message("boom".into()))
            .with("context_test_shadowed", "local");
        assert_eq!(as_map(&err, true)["context_test_shadowed"], Value::from("local"));
        remove_global("context_test_shadowed");
    }

    #[test]
    fn test_write_value() {
        let mut buf = String::new();
        write_value(&mut buf, &Value::from("text"));
        buf.push(' ');
        write_value(&mut buf, &Value::from(3));
        assert_eq!(buf, "text 3");
    }
}
