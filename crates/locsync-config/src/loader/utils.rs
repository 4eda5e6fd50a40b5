//! Helper utilities for config paths and endpoint normalization.

use super::{ConfigKey, DEFAULT_CONFIG_FILE};
use crate::ConfigError;
use std::path::PathBuf;
use url::Url;

/// `config.yaml` next to the executable when present, otherwise in the cwd.
pub(super) fn default_config_path() -> PathBuf {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_CONFIG_FILE)));
    match beside_exe {
        Some(path) if path.exists() => path,
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Instance names like `acme.service-now.com` are reached over https.
pub(super) fn normalize_servicenow_endpoint(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("http") {
        trim_endpoint(raw)
    } else {
        trim_endpoint(&format!("https://{raw}"))
    }
}

pub(super) fn trim_endpoint(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

pub(super) fn validate_url(raw: &str, key: ConfigKey) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidField {
        path: key.as_str().to_string(),
        message: format!("invalid URL {raw:?}: {err}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidField {
            path: key.as_str().to_string(),
            message: format!("unsupported URL scheme {:?}", url.scheme()),
        });
    }
    Ok(())
}
