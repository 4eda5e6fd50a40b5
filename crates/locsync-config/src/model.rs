//! Configuration schema for locsync.

use log::LevelFilter;
use std::path::PathBuf;

/// Default extensible attribute synchronized by locsync.
pub const DEFAULT_ATTRIBUTE_NAME: &str = "Location";
/// Default directory for rotated log files.
pub const DEFAULT_LOG_DIR: &str = "./";

/// Root config shared by the sync and flush workflows.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// ServiceNow settings; only present when loaded for the sync workflow.
    pub servicenow: Option<ServiceNowConfig>,
    pub infoblox: InfobloxConfig,
    /// Forward proxy used for both HTTP and HTTPS traffic to both systems.
    pub proxy: Option<String>,
    pub logging: LoggingConfig,
}

/// Connection settings for the ServiceNow table API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNowConfig {
    /// Instance base URL, always with a scheme and without a trailing slash.
    pub endpoint: String,
    pub username: String,
    pub token: String,
    /// Maximum number of location rows requested (`sysparm_limit`).
    pub limit: u32,
}

/// Connection settings for the Infoblox WAPI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfobloxConfig {
    /// WAPI base URL (e.g. `https://gm.example.net/wapi/v2.12`), no trailing slash.
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Extensible attribute kept in sync, `Location` unless configured.
    pub attribute_name: String,
}

/// Log destination and verbosity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            level: LogLevel::default(),
        }
    }
}

/// Log verbosity as written in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Parse a `LOG_LEVEL` value; unknown names fall back to `Info`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DEBUG" | "TRACE" => Self::Debug,
            "WARNING" | "WARN" => Self::Warning,
            "ERROR" => Self::Error,
            "CRITICAL" | "FATAL" => Self::Critical,
            _ => Self::Info,
        }
    }

    /// Map onto the `log` crate's level filter.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::Debug,
            Self::Info => LevelFilter::Info,
            Self::Warning => LevelFilter::Warn,
            Self::Error | Self::Critical => LevelFilter::Error,
        }
    }
}
