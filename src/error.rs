//! Error types shared across the facility.

use std::sync::Arc;
use thiserror::Error;

/// An error as seen by reporters and returned from error-level calls.
///
/// Errors travel as `Arc` so that a caller's error can be handed back
/// unchanged; use [`Arc::ptr_eq`] to check identity.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors synthesized by the logger itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    /// A non-error value passed to an error-level call, or a message built
    /// from a template when none of the arguments was an error.
    #[error("{0}")]
    Message(String),
}

impl LogError {
    /// Wrap `self` into a [`SharedError`].
    pub fn shared(self) -> SharedError {
        Arc::new(self)
    }
}

/// Convert any error into a [`SharedError`].
pub fn share<E>(err: E) -> SharedError
where
    E: std::error::Error + Send + Sync + 'static,
{
    Arc::new(err)
}
