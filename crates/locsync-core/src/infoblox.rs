//! Infoblox extensible attribute definitions: read and replace.

use crate::SyncError;
use crate::http::{self, build_client};
use async_trait::async_trait;
use locsync_config::{InfobloxConfig, SyncConfig};
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// WAPI object type for extensible attribute definitions.
pub const DEFINITION_OBJECT: &str = "extensibleattributedef";

/// Opaque `_ref` handle of a definition, as returned by the WAPI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRef(String);

impl AttributeRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current state of an attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    pub reference: AttributeRef,
    /// Allowed values in the order the WAPI returned them.
    pub values: Vec<String>,
}

impl AttributeDefinition {
    pub fn value_set(&self) -> BTreeSet<String> {
        self.values.iter().cloned().collect()
    }
}

/// Store holding the enumerated attribute definitions.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Look up the definition named `name`, with its allowed values.
    async fn read_definition(&self, name: &str) -> Result<AttributeDefinition, SyncError>;

    /// Replace the whole allowed-values list of the referenced definition.
    async fn replace_values(
        &self,
        reference: &AttributeRef,
        values: &[String],
    ) -> Result<(), SyncError>;
}

#[derive(Debug, Deserialize)]
struct WireDefinition {
    #[serde(rename = "_ref")]
    reference: AttributeRef,
    #[serde(default)]
    list_values: Option<Vec<WireValue>>,
}

#[derive(Debug, Deserialize)]
struct WireValue {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListValuesPayload<'a> {
    list_values: Vec<ValueEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ValueEntry<'a> {
    value: &'a str,
}

/// Client for the Infoblox WAPI.
#[derive(Debug, Clone)]
pub struct InfobloxClient {
    client: Client,
    settings: InfobloxConfig,
}

impl InfobloxClient {
    pub fn new(settings: &InfobloxConfig, proxy: Option<&str>) -> Result<Self, SyncError> {
        Ok(Self {
            client: build_client("Infoblox", proxy)?,
            settings: settings.clone(),
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        Self::new(&config.infoblox, config.proxy.as_deref())
    }

    /// Name of the attribute this client was configured for.
    pub fn attribute_name(&self) -> &str {
        &self.settings.attribute_name
    }
}

#[async_trait]
impl AttributeStore for InfobloxClient {
    async fn read_definition(&self, name: &str) -> Result<AttributeDefinition, SyncError> {
        let url = format!("{}/{DEFINITION_OBJECT}", self.settings.endpoint);
        info!("fetching Infoblox EA definition for '{name}': {url}");
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.settings.username, Some(&self.settings.password))
            .query(&[("name", name), ("_return_fields", "list_values")])
            .send()
            .await
            .map_err(http::transport(&url))?;
        let body = http::read_body(response, &url, &[StatusCode::OK]).await?;
        let matches: Vec<WireDefinition> = http::decode(&body, &url)?;

        let match_count = matches.len();
        let Some(found) = matches.into_iter().next() else {
            return Err(SyncError::NotFound(name.to_string()));
        };
        if match_count > 1 {
            warn!("{match_count} definitions matched EA '{name}', using the first");
        }

        let values: Vec<String> = found
            .list_values
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| entry.value)
            .collect();
        info!(
            "found EA '{name}' _ref={} with {} values",
            found.reference,
            values.len()
        );
        Ok(AttributeDefinition {
            reference: found.reference,
            values,
        })
    }

    async fn replace_values(
        &self,
        reference: &AttributeRef,
        values: &[String],
    ) -> Result<(), SyncError> {
        let url = format!("{}/{}", self.settings.endpoint, reference);
        let payload = ListValuesPayload {
            list_values: values
                .iter()
                .map(|value| ValueEntry {
                    value: value.as_str(),
                })
                .collect(),
        };
        info!(
            "updating Infoblox EA values at {url} with payload: {}",
            serde_json::to_string(&payload).unwrap_or_default()
        );
        let response = self
            .client
            .put(&url)
            .basic_auth(&self.settings.username, Some(&self.settings.password))
            .json(&payload)
            .send()
            .await
            .map_err(http::transport(&url))?;
        let body =
            http::read_body(response, &url, &[StatusCode::OK, StatusCode::CREATED]).await?;
        debug!("Infoblox update response: {}", http::excerpt(&body));
        info!("Infoblox EA update successful");
        Ok(())
    }
}
