//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject subsystem names that could never match a logger
//! - Detect duplicate allow-list entries
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LogConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{LogConfig, TraceSetting};

/// A single semantic problem in a [`LogConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Entry contains a character that cannot appear in a subsystem name.
    #[error("trace subsystem {name:?} contains {found:?}")]
    InvalidSubsystem { name: String, found: char },

    /// Entry listed more than once.
    #[error("trace subsystem {0:?} listed more than once")]
    DuplicateSubsystem(String),
}

/// Check `config` for semantic problems.
pub fn validate_config(config: &LogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let TraceSetting::Subsystems(names) = &config.trace {
        let mut seen = HashSet::new();
        for name in names {
            if let Some(found) = name.chars().find(|c| *c == ',' || c.is_control()) {
                errors.push(ValidationError::InvalidSubsystem {
                    name: name.clone(),
                    found,
                });
            }
            if !seen.insert(name.as_str()) {
                errors.push(ValidationError::DuplicateSubsystem(name.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
