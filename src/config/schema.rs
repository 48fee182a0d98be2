//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//!
//! ```toml
//! # true / false, a list of subsystem names, or "name1,name2"
//! trace = ["db", "net"]
//! print_stack = false
//! ```

use serde::{Deserialize, Serialize};

/// Environment variable enabling trace output: a boolean or a
/// comma-separated list of subsystem names.
pub const TRACE_ENV: &str = "TRACE";

/// Environment variable enabling a stack dump after every record.
pub const PRINT_STACK_ENV: &str = "PRINT_STACK";

/// Logger configuration, resolved once per logger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Which subsystems emit TRACE records.
    pub trace: TraceSetting,

    /// Dump the call stack to the error sink after every record.
    pub print_stack: bool,
}

impl LogConfig {
    /// Resolve from `TRACE` and `PRINT_STACK` in the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            trace: lookup(TRACE_ENV)
                .map(|v| TraceSetting::parse(&v))
                .unwrap_or_default(),
            print_stack: lookup(PRINT_STACK_ENV)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(false),
        }
    }

    /// Apply variables that are present in the environment on top of `self`.
    pub fn overlay_env(self) -> Self {
        self.overlay_lookup(|key| std::env::var(key).ok())
    }

    pub fn overlay_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(TRACE_ENV) {
            self.trace = TraceSetting::parse(&v);
        }
        if let Some(v) = lookup(PRINT_STACK_ENV) {
            self.print_stack = parse_bool(&v).unwrap_or(false);
        }
        self
    }

    /// True if a logger named `name` emits TRACE records.
    pub fn trace_enabled_for(&self, name: &str) -> bool {
        self.trace.enabled_for(name)
    }
}

/// Trace enablement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "RawTrace", into = "RawTrace")]
pub enum TraceSetting {
    #[default]
    Off,
    /// Every subsystem.
    All,
    /// Only the named subsystems.
    Subsystems(Vec<String>),
}

impl TraceSetting {
    /// Parse a boolean, or else a comma-separated allow-list whose entries
    /// are trimmed of surrounding spaces.
    pub fn parse(value: &str) -> Self {
        match parse_bool(value) {
            Some(true) => TraceSetting::All,
            Some(false) => TraceSetting::Off,
            None => Self::from_names(value.split(',')),
        }
    }

    fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim_matches(' ').to_owned())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            TraceSetting::Off
        } else {
            TraceSetting::Subsystems(names)
        }
    }

    pub fn enabled_for(&self, name: &str) -> bool {
        match self {
            TraceSetting::Off => false,
            TraceSetting::All => true,
            TraceSetting::Subsystems(names) => names.iter().any(|n| n == name),
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum RawTrace {
    Flag(bool),
    Names(Vec<String>),
    Text(String),
}

impl From<RawTrace> for TraceSetting {
    fn from(raw: RawTrace) -> Self {
        match raw {
            RawTrace::Flag(true) => TraceSetting::All,
            RawTrace::Flag(false) => TraceSetting::Off,
            RawTrace::Names(names) => TraceSetting::from_names(names),
            RawTrace::Text(text) => TraceSetting::parse(&text),
        }
    }
}

impl From<TraceSetting> for RawTrace {
    fn from(setting: TraceSetting) -> Self {
        match setting {
            TraceSetting::Off => RawTrace::Flag(false),
            TraceSetting::All => RawTrace::Flag(true),
            TraceSetting::Subsystems(names) => RawTrace::Names(names),
        }
    }
}

/// Boolean grammar shared by `TRACE` and `PRINT_STACK`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_parse_bool_grammar() {
        for v in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(v), Some(true), "{}", v);
        }
        for v in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(v), Some(false), "{}", v);
        }
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool(" true"), None);
    }

    #[test]
    fn test_trace_allow_list() {
        let setting = TraceSetting::parse("db, net ,  cache");
        assert!(setting.enabled_for("db"));
        assert!(setting.enabled_for("net"));
        assert!(setting.enabled_for("cache"));
        assert!(!setting.enabled_for("http"));
    }

    #[test]
    fn test_trace_empty_is_off() {
        assert_eq!(TraceSetting::parse(""), TraceSetting::Off);
        assert_eq!(TraceSetting::parse(" , "), TraceSetting::Off);
    }

    #[test]
    fn test_from_lookup() {
        let config = LogConfig::from_lookup(lookup(&[("TRACE", "true"), ("PRINT_STACK", "1")]));
        assert_eq!(config.trace, TraceSetting::All);
        assert!(config.print_stack);

        let config = LogConfig::from_lookup(lookup(&[("PRINT_STACK", "nope")]));
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_overlay_only_present_vars() {
        let base = LogConfig {
            trace: TraceSetting::Subsystems(vec!["db".into()]),
            print_stack: true,
        };
        let config = base.clone().overlay_lookup(lookup(&[]));
        assert_eq!(config, base);

        let config = base.overlay_lookup(lookup(&[("TRACE", "false")]));
        assert_eq!(config.trace, TraceSetting::Off);
        assert!(config.print_stack);
    }

    #[test]
    fn test_toml_forms() {
        let config: LogConfig = toml::from_str("trace = true").unwrap();
        assert_eq!(config.trace, TraceSetting::All);

        let config: LogConfig = toml::from_str("trace = [\"db\", \"net\"]").unwrap();
        assert!(config.trace_enabled_for("net"));

        let config: LogConfig = toml::from_str("trace = \"db, net\"\nprint_stack = true").unwrap();
        assert!(config.trace_enabled_for("db"));
        assert!(config.print_stack);

        let config: LogConfig = toml::from_str("").unwrap();
        assert_eq!(config, LogConfig::default());
    }
}
