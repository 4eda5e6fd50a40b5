//! Config loader: YAML file layer, environment layer, validation.
//!
//! The file is parsed into a JSON value, schema-checked, merged with any
//! environment overrides and finally resolved into a [`SyncConfig`] for the
//! requested [`ConfigProfile`].

mod merge;
mod schema;
mod utils;

#[cfg(test)]
mod tests;

use crate::{
    ConfigError, DEFAULT_ATTRIBUTE_NAME, DEFAULT_LOG_DIR, InfobloxConfig, LogLevel, LoggingConfig,
    ServiceNowConfig, SyncConfig,
};
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename, looked up next to the executable and in the cwd.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Keys recognised in `config.yaml` and as environment overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    ServiceNowEndpoint,
    ServiceNowUsername,
    ServiceNowToken,
    ServiceNowLimit,
    Proxy,
    InfobloxEndpoint,
    InfobloxUsername,
    InfobloxPassword,
    InfobloxAttributeName,
    LogDir,
    LogLevel,
}

impl ConfigKey {
    /// Every recognised key, in file order.
    pub const ALL: [ConfigKey; 11] = [
        ConfigKey::ServiceNowEndpoint,
        ConfigKey::ServiceNowUsername,
        ConfigKey::ServiceNowToken,
        ConfigKey::ServiceNowLimit,
        ConfigKey::Proxy,
        ConfigKey::InfobloxEndpoint,
        ConfigKey::InfobloxUsername,
        ConfigKey::InfobloxPassword,
        ConfigKey::InfobloxAttributeName,
        ConfigKey::LogDir,
        ConfigKey::LogLevel,
    ];

    /// Name of the key in the YAML file and in the environment.
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::ServiceNowEndpoint => "SERVICENOW_API_ENDPOINT",
            ConfigKey::ServiceNowUsername => "SERVICENOW_API_USERNAME",
            ConfigKey::ServiceNowToken => "SERVICENOW_API_TOKEN",
            ConfigKey::ServiceNowLimit => "SERVICE_NOW_API_LIMIT",
            ConfigKey::Proxy => "SERVICENOW_PROXY",
            ConfigKey::InfobloxEndpoint => "INFOBLOX_API_ENDPOINT",
            ConfigKey::InfobloxUsername => "INFOBLOX_API_USERNAME",
            ConfigKey::InfobloxPassword => "INFOBLOX_API_PASSWORD",
            ConfigKey::InfobloxAttributeName => "INFOBLOX_EA_NAME",
            ConfigKey::LogDir => "LOG_DIR",
            ConfigKey::LogLevel => "LOG_LEVEL",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

/// Which workflow the config is loaded for; decides the required keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigProfile {
    /// ServiceNow -> Infoblox synchronization: both systems required.
    Sync,
    /// Sentinel flush of the attribute: only Infoblox required.
    Flush,
}

impl ConfigProfile {
    fn required_keys(self) -> &'static [ConfigKey] {
        match self {
            ConfigProfile::Sync => &[
                ConfigKey::InfobloxEndpoint,
                ConfigKey::InfobloxUsername,
                ConfigKey::InfobloxPassword,
                ConfigKey::ServiceNowUsername,
                ConfigKey::ServiceNowToken,
                ConfigKey::ServiceNowEndpoint,
                ConfigKey::ServiceNowLimit,
            ],
            ConfigProfile::Flush => &[
                ConfigKey::InfobloxEndpoint,
                ConfigKey::InfobloxUsername,
                ConfigKey::InfobloxPassword,
            ],
        }
    }
}

/// Options controlling where config is read from and what overrides apply.
#[derive(Debug, Clone)]
pub struct ConfigLoadOptions {
    /// Path of the YAML config file.
    pub path: PathBuf,
    /// Workflow the config is loaded for.
    pub profile: ConfigProfile,
    /// Overrides applied on top of the file (highest precedence).
    pub overrides: Map<String, Value>,
}

impl ConfigLoadOptions {
    /// Create options for a config file with no overrides.
    pub fn new(path: impl AsRef<Path>, profile: ConfigProfile) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            profile,
            overrides: Map::new(),
        }
    }

    /// Create options for the default config location.
    pub fn discover(profile: ConfigProfile) -> Self {
        Self::new(utils::default_config_path(), profile)
    }

    /// Pick up every recognised key present in the process environment.
    pub fn with_env(mut self) -> Self {
        for key in ConfigKey::ALL {
            if let Ok(value) = std::env::var(key.as_str()) {
                debug!("config key overridden from environment: {}", key.as_str());
                self.overrides
                    .insert(key.as_str().to_string(), Value::String(value));
            }
        }
        self
    }

    /// Override a single key.
    pub fn with_override(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.overrides
            .insert(key.as_str().to_string(), Value::String(value.into()));
        self
    }
}

impl SyncConfig {
    /// Load the config file, apply overrides and validate for the profile.
    pub fn load(options: &ConfigLoadOptions) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", options.path.display());
        let contents = fs::read_to_string(&options.path)?;
        let label = options.path.display().to_string();
        let mut merged = parse_layer(&contents, &label)?;

        schema::validate_layer_schema(&Value::Object(options.overrides.clone()), "environment")?;
        if let Some(file_layer) = merged.as_object_mut() {
            merge::apply_overrides(file_layer, &options.overrides);
        }

        config_from_value(merged, options.profile)
    }

    /// Load config from raw YAML contents without any overrides.
    pub fn load_from_str(contents: &str, profile: ConfigProfile) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value = parse_layer(contents, "config")?;
        config_from_value(value, profile)
    }

    /// Validate invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        utils::validate_url(&self.infoblox.endpoint, ConfigKey::InfobloxEndpoint)?;
        if self.infoblox.attribute_name.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                path: ConfigKey::InfobloxAttributeName.as_str().to_string(),
                message: "attribute name cannot be empty".to_string(),
            });
        }
        if let Some(servicenow) = &self.servicenow {
            utils::validate_url(&servicenow.endpoint, ConfigKey::ServiceNowEndpoint)?;
            if servicenow.limit == 0 {
                return Err(ConfigError::InvalidField {
                    path: ConfigKey::ServiceNowLimit.as_str().to_string(),
                    message: "must be a positive integer".to_string(),
                });
            }
        }
        if let Some(proxy) = &self.proxy {
            utils::validate_url(proxy, ConfigKey::Proxy)?;
        }
        Ok(())
    }
}

/// Flat view of the file, keyed exactly like `config.yaml`.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(rename = "SERVICENOW_API_ENDPOINT", default)]
    servicenow_endpoint: Option<String>,
    #[serde(rename = "SERVICENOW_API_USERNAME", default)]
    servicenow_username: Option<String>,
    #[serde(rename = "SERVICENOW_API_TOKEN", default)]
    servicenow_token: Option<String>,
    #[serde(rename = "SERVICE_NOW_API_LIMIT", default)]
    servicenow_limit: Option<Value>,
    #[serde(rename = "SERVICENOW_PROXY", default)]
    proxy: Option<String>,
    #[serde(rename = "INFOBLOX_API_ENDPOINT", default)]
    infoblox_endpoint: Option<String>,
    #[serde(rename = "INFOBLOX_API_USERNAME", default)]
    infoblox_username: Option<String>,
    #[serde(rename = "INFOBLOX_API_PASSWORD", default)]
    infoblox_password: Option<String>,
    #[serde(rename = "INFOBLOX_EA_NAME", default)]
    infoblox_attribute_name: Option<String>,
    #[serde(rename = "LOG_DIR", default)]
    log_dir: Option<String>,
    #[serde(rename = "LOG_LEVEL", default)]
    log_level: Option<String>,
}

impl RawConfig {
    fn is_set(&self, key: ConfigKey) -> bool {
        let text = match key {
            ConfigKey::ServiceNowEndpoint => &self.servicenow_endpoint,
            ConfigKey::ServiceNowUsername => &self.servicenow_username,
            ConfigKey::ServiceNowToken => &self.servicenow_token,
            ConfigKey::ServiceNowLimit => {
                return match &self.servicenow_limit {
                    None | Some(Value::Null) => false,
                    Some(Value::String(value)) => !value.trim().is_empty(),
                    Some(_) => true,
                };
            }
            ConfigKey::Proxy => &self.proxy,
            ConfigKey::InfobloxEndpoint => &self.infoblox_endpoint,
            ConfigKey::InfobloxUsername => &self.infoblox_username,
            ConfigKey::InfobloxPassword => &self.infoblox_password,
            ConfigKey::InfobloxAttributeName => &self.infoblox_attribute_name,
            ConfigKey::LogDir => &self.log_dir,
            ConfigKey::LogLevel => &self.log_level,
        };
        text.as_deref().is_some_and(|value| !value.trim().is_empty())
    }

    fn resolve(self, profile: ConfigProfile) -> Result<SyncConfig, ConfigError> {
        let missing: Vec<String> = profile
            .required_keys()
            .iter()
            .filter(|key| !self.is_set(**key))
            .map(|key| key.as_str().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        let servicenow = match profile {
            ConfigProfile::Sync => Some(ServiceNowConfig {
                endpoint: utils::normalize_servicenow_endpoint(
                    self.servicenow_endpoint.as_deref().unwrap_or_default(),
                ),
                username: self.servicenow_username.unwrap_or_default(),
                token: self.servicenow_token.unwrap_or_default(),
                limit: parse_limit(self.servicenow_limit.as_ref())?,
            }),
            ConfigProfile::Flush => None,
        };

        let infoblox = InfobloxConfig {
            endpoint: utils::trim_endpoint(self.infoblox_endpoint.as_deref().unwrap_or_default()),
            username: self.infoblox_username.unwrap_or_default(),
            password: self.infoblox_password.unwrap_or_default(),
            attribute_name: non_empty(self.infoblox_attribute_name)
                .unwrap_or_else(|| DEFAULT_ATTRIBUTE_NAME.to_string()),
        };

        let logging = LoggingConfig {
            dir: PathBuf::from(
                non_empty(self.log_dir).unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
            ),
            level: self
                .log_level
                .as_deref()
                .map(LogLevel::parse_lenient)
                .unwrap_or_default(),
        };

        Ok(SyncConfig {
            servicenow,
            infoblox,
            proxy: non_empty(self.proxy),
            logging,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse the row limit from either a YAML integer or a numeric string.
fn parse_limit(value: Option<&Value>) -> Result<u32, ConfigError> {
    let invalid = |found: String| ConfigError::InvalidField {
        path: ConfigKey::ServiceNowLimit.as_str().to_string(),
        message: format!("must be an integer, found: {found}"),
    };
    match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|limit| u32::try_from(limit).ok())
            .ok_or_else(|| invalid(number.to_string())),
        Some(Value::String(text)) => text.trim().parse::<u32>().map_err(|_| invalid(text.clone())),
        Some(other) => Err(invalid(other.to_string())),
        None => Err(invalid("nothing".to_string())),
    }
}

/// Parse one YAML document into a schema-checked JSON object.
fn parse_layer(contents: &str, label: &str) -> Result<Value, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let value: Value = serde_yaml::from_str(contents)?;
    let value = match value {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    schema::validate_layer_schema(&value, label)?;
    Ok(schema::normalize_scalars(value))
}

fn config_from_value(value: Value, profile: ConfigProfile) -> Result<SyncConfig, ConfigError> {
    let raw: RawConfig = serde_json::from_value(value)?;
    let config = raw.resolve(profile)?;
    config.validate()?;
    debug!(
        "config resolved (profile={:?}, attribute={}, proxy_set={})",
        profile,
        config.infoblox.attribute_name,
        config.proxy.is_some()
    );
    Ok(config)
}
