//! Config fixtures pointing at mock servers.

use locsync_config::{
    DEFAULT_ATTRIBUTE_NAME, InfobloxConfig, LoggingConfig, ServiceNowConfig, SyncConfig,
};

/// Build a config for the given endpoints; `servicenow` is `None` for flush runs.
pub fn test_config(servicenow: Option<&str>, infoblox: &str) -> SyncConfig {
    SyncConfig {
        servicenow: servicenow.map(|endpoint| ServiceNowConfig {
            endpoint: endpoint.to_string(),
            username: "svc-sync".to_string(),
            token: "snow-token".to_string(),
            limit: 1000,
        }),
        infoblox: InfobloxConfig {
            endpoint: infoblox.to_string(),
            username: "admin".to_string(),
            password: "infoblox".to_string(),
            attribute_name: DEFAULT_ATTRIBUTE_NAME.to_string(),
        },
        proxy: None,
        logging: LoggingConfig::default(),
    }
}
