//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → schema.rs (TRACE / PRINT_STACK overlay from the environment)
//!     → validation.rs (semantic checks)
//!     → LogConfig (validated, immutable)
//!     → read once when a Logger is built
//! ```
//!
//! # Design Decisions
//! - Config is read at logger construction only; later environment
//!   changes do not reach loggers that already exist
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, resolve_config, ConfigError};
pub use schema::{parse_bool, LogConfig, TraceSetting, PRINT_STACK_ENV, TRACE_ENV};
pub use validation::{validate_config, ValidationError};
