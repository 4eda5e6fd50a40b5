//! Configuration model and loading for locsync.
//!
//! This crate owns the `config.yaml` schema, environment overrides and
//! validation. The result is a single immutable [`SyncConfig`] that the
//! binary builds once and hands to every component by reference.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Loader options and the key names recognised in config files.
pub use loader::{ConfigKey, ConfigLoadOptions, ConfigProfile, DEFAULT_CONFIG_FILE};
/// Configuration schema models.
pub use model::*;
