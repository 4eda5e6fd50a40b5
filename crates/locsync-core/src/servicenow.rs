//! ServiceNow location fetcher.

use crate::SyncError;
use crate::http::{self, build_client};
use async_trait::async_trait;
use locsync_config::{ServiceNowConfig, SyncConfig};
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Table API path of the location table.
pub const LOCATION_TABLE_PATH: &str = "/api/now/table/cmn_location";
/// Location types that make up the `Country/City/Campus` hierarchy.
pub const LOCATION_TYPES: [&str; 3] = ["country", "city", "campus"];

/// Source of desired location names.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Return the distinct, trimmed location names.
    async fn fetch_locations(&self) -> Result<BTreeSet<String>, SyncError>;
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    #[serde(default)]
    result: Option<Vec<LocationRow>>,
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    #[serde(default)]
    name: Option<String>,
}

/// Client for the ServiceNow table API.
#[derive(Debug, Clone)]
pub struct ServiceNowClient {
    client: Client,
    settings: ServiceNowConfig,
}

impl ServiceNowClient {
    pub fn new(settings: &ServiceNowConfig, proxy: Option<&str>) -> Result<Self, SyncError> {
        Ok(Self {
            client: build_client("ServiceNow", proxy)?,
            settings: settings.clone(),
        })
    }

    /// Build the client from the sync config; `None` when ServiceNow isn't configured.
    pub fn from_config(config: &SyncConfig) -> Option<Result<Self, SyncError>> {
        config
            .servicenow
            .as_ref()
            .map(|settings| Self::new(settings, config.proxy.as_deref()))
    }

    fn url(&self) -> String {
        format!("{}{}", self.settings.endpoint, LOCATION_TABLE_PATH)
    }
}

#[async_trait]
impl LocationSource for ServiceNowClient {
    async fn fetch_locations(&self) -> Result<BTreeSet<String>, SyncError> {
        let url = self.url();
        let type_query = format!("cmn_location_typeIN{}", LOCATION_TYPES.join(","));
        let limit = self.settings.limit.to_string();
        info!("fetching locations from ServiceNow: {url}");
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.settings.username, Some(&self.settings.token))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .query(&[
                ("sysparm_query", type_query.as_str()),
                ("sysparm_limit", limit.as_str()),
                ("sysparm_fields", "name"),
            ])
            .send()
            .await
            .map_err(http::transport(&url))?;
        let body = http::read_body(response, &url, &[StatusCode::OK]).await?;
        let table: TableResponse = http::decode(&body, &url)?;

        let rows = table.result.unwrap_or_default();
        let row_count = rows.len();
        let locations: BTreeSet<String> = rows
            .into_iter()
            .filter_map(|row| row.name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        debug!("ServiceNow returned {row_count} rows");
        info!("fetched {} locations from ServiceNow", locations.len());
        Ok(locations)
    }
}
