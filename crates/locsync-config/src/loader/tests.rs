//! Tests for config loading and validation.

use super::*;
use crate::{LogLevel, LoggingConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
SERVICENOW_API_ENDPOINT: acme.service-now.com/
SERVICENOW_API_USERNAME: svc-sync
SERVICENOW_API_TOKEN: snow-secret
SERVICE_NOW_API_LIMIT: 500
SERVICENOW_PROXY: http://proxy.acme.local:3128
INFOBLOX_API_ENDPOINT: https://gm.acme.local/wapi/v2.12/
INFOBLOX_API_USERNAME: admin
INFOBLOX_API_PASSWORD: 123456
LOG_DIR: /var/log/locsync
LOG_LEVEL: debug
"#;

/// Write YAML contents to a path, creating parent directories if needed.
fn write_yaml(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Verify that a complete sync config resolves and normalizes endpoints.
#[test]
fn parse_full_sync_config() {
    let config = SyncConfig::load_from_str(FULL_CONFIG, ConfigProfile::Sync).expect("config");
    let servicenow = config.servicenow.expect("servicenow");
    assert_eq!(servicenow.endpoint, "https://acme.service-now.com");
    assert_eq!(servicenow.limit, 500);
    assert_eq!(config.infoblox.endpoint, "https://gm.acme.local/wapi/v2.12");
    assert_eq!(config.infoblox.password, "123456");
    assert_eq!(config.infoblox.attribute_name, "Location");
    assert_eq!(config.proxy.as_deref(), Some("http://proxy.acme.local:3128"));
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.dir, PathBuf::from("/var/log/locsync"));
}

#[test]
fn flush_profile_only_needs_infoblox_keys() {
    let yaml = r#"
INFOBLOX_API_ENDPOINT: https://gm.acme.local/wapi/v2.12
INFOBLOX_API_USERNAME: admin
INFOBLOX_API_PASSWORD: secret
INFOBLOX_EA_NAME: Site
"#;
    let config = SyncConfig::load_from_str(yaml, ConfigProfile::Flush).expect("config");
    assert!(config.servicenow.is_none());
    assert_eq!(config.infoblox.attribute_name, "Site");
    assert_eq!(config.logging, LoggingConfig::default());
    assert!(config.proxy.is_none());
}

/// All missing keys are reported together.
#[test]
fn reports_every_missing_key() {
    let yaml = r#"
INFOBLOX_API_ENDPOINT: https://gm.acme.local/wapi/v2.12
INFOBLOX_API_USERNAME: ""
SERVICENOW_API_ENDPOINT: acme.service-now.com
"#;
    let err = SyncConfig::load_from_str(yaml, ConfigProfile::Sync).unwrap_err();
    let ConfigError::MissingKeys(keys) = err else {
        panic!("expected missing keys, got {err}");
    };
    assert_eq!(
        keys,
        vec![
            "INFOBLOX_API_USERNAME".to_string(),
            "INFOBLOX_API_PASSWORD".to_string(),
            "SERVICENOW_API_USERNAME".to_string(),
            "SERVICENOW_API_TOKEN".to_string(),
            "SERVICE_NOW_API_LIMIT".to_string(),
        ]
    );
}

#[test]
fn empty_file_reports_missing_keys() {
    let err = SyncConfig::load_from_str("", ConfigProfile::Flush).unwrap_err();
    assert!(matches!(err, ConfigError::MissingKeys(keys) if keys.len() == 3));
}

/// Row limit may be written as a numeric string.
#[test]
fn accepts_numeric_string_limit() {
    let yaml = FULL_CONFIG.replace(
        "SERVICE_NOW_API_LIMIT: 500",
        "SERVICE_NOW_API_LIMIT: \"250\"",
    );
    let config = SyncConfig::load_from_str(&yaml, ConfigProfile::Sync).expect("config");
    assert_eq!(config.servicenow.expect("servicenow").limit, 250);
}

#[test]
fn rejects_non_integer_limit() {
    for bad in ["abc", "12.5", "-3"] {
        let yaml = FULL_CONFIG.replace(
            "SERVICE_NOW_API_LIMIT: 500",
            &format!("SERVICE_NOW_API_LIMIT: {bad}"),
        );
        let err = SyncConfig::load_from_str(&yaml, ConfigProfile::Sync).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("SERVICE_NOW_API_LIMIT"), "{bad}: {msg}");
    }
}

#[test]
fn rejects_zero_limit() {
    let yaml = FULL_CONFIG.replace("SERVICE_NOW_API_LIMIT: 500", "SERVICE_NOW_API_LIMIT: 0");
    let err = SyncConfig::load_from_str(&yaml, ConfigProfile::Sync).unwrap_err();
    assert!(format!("{err}").contains("positive"));
}

/// Nested values are not valid for scalar keys.
#[test]
fn rejects_structured_value_for_scalar_key() {
    let yaml = FULL_CONFIG.replace(
        "INFOBLOX_API_USERNAME: admin",
        "INFOBLOX_API_USERNAME:\n  - admin",
    );
    let err = SyncConfig::load_from_str(&yaml, ConfigProfile::Sync).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("INFOBLOX_API_USERNAME"), "{msg}");
}

#[test]
fn rejects_non_mapping_document() {
    let err = SyncConfig::load_from_str("- a\n- b\n", ConfigProfile::Flush).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidField { .. }));
}

#[test]
fn unknown_keys_are_ignored() {
    let yaml = format!("{FULL_CONFIG}\nGPON_IMPORT_BATCH: 10\n");
    SyncConfig::load_from_str(&yaml, ConfigProfile::Sync).expect("config");
}

#[test]
fn rejects_invalid_proxy_url() {
    let yaml = FULL_CONFIG.replace(
        "SERVICENOW_PROXY: http://proxy.acme.local:3128",
        "SERVICENOW_PROXY: not a url",
    );
    let err = SyncConfig::load_from_str(&yaml, ConfigProfile::Sync).unwrap_err();
    assert!(format!("{err}").contains("SERVICENOW_PROXY"));
}

#[test]
fn unknown_log_level_falls_back_to_info() {
    let yaml = FULL_CONFIG.replace("LOG_LEVEL: debug", "LOG_LEVEL: chatty");
    let config = SyncConfig::load_from_str(&yaml, ConfigProfile::Sync).expect("config");
    assert_eq!(config.logging.level, LogLevel::Info);
}

/// Overrides win over the file, and can fill in keys the file leaves out.
#[test]
fn overrides_take_precedence_over_file() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("conf").join(DEFAULT_CONFIG_FILE);
    write_yaml(
        &path,
        r#"
INFOBLOX_API_ENDPOINT: https://gm.acme.local/wapi/v2.12
INFOBLOX_API_USERNAME: admin
INFOBLOX_API_PASSWORD: from-file
"#,
    );

    let options = ConfigLoadOptions::new(&path, ConfigProfile::Flush)
        .with_override(ConfigKey::InfobloxPassword, "from-env")
        .with_override(ConfigKey::Proxy, "https://proxy.acme.local:8443");
    let config = SyncConfig::load(&options).expect("config");
    assert_eq!(config.infoblox.password, "from-env");
    assert_eq!(config.proxy.as_deref(), Some("https://proxy.acme.local:8443"));
}

#[test]
fn missing_file_is_a_read_error() {
    let temp = TempDir::new().expect("tmp");
    let options = ConfigLoadOptions::new(temp.path().join("absent.yaml"), ConfigProfile::Sync);
    let err = SyncConfig::load(&options).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = SyncConfig::load_from_str("KEY: [unterminated", ConfigProfile::Flush).unwrap_err();
    assert!(matches!(err, ConfigError::ParseFailed(_)));
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a mapping, got {other}"),
    }
}

#[test]
fn null_override_keeps_file_value() {
    let mut base = object(serde_json::json!({ "LOG_DIR": "/tmp" }));
    let overrides = object(serde_json::json!({ "LOG_DIR": null, "LOG_LEVEL": "ERROR" }));
    merge::apply_overrides(&mut base, &overrides);
    assert_eq!(
        Value::Object(base),
        serde_json::json!({ "LOG_DIR": "/tmp", "LOG_LEVEL": "ERROR" })
    );
}

/// Defaults apply when the optional keys are absent from file and environment.
#[test]
fn optional_keys_fall_back_to_defaults() {
    let yaml = r#"
INFOBLOX_API_ENDPOINT: https://gm.acme.local/wapi/v2.12
INFOBLOX_API_USERNAME: admin
INFOBLOX_API_PASSWORD: secret
"#;
    let config = SyncConfig::load_from_str(yaml, ConfigProfile::Flush).expect("config");
    assert_eq!(config.infoblox.attribute_name, DEFAULT_ATTRIBUTE_NAME);
    assert_eq!(config.logging.dir, PathBuf::from(DEFAULT_LOG_DIR));
    assert_eq!(config.logging.level, LogLevel::Info);
}
