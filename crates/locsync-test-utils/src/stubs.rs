//! In-memory stand-ins for the core traits.

use async_trait::async_trait;
use locsync_core::{AttributeDefinition, AttributeRef, AttributeStore, LocationSource, SyncError};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};

/// Location source returning a fixed set, or a fixed HTTP failure.
#[derive(Default)]
pub struct StubLocationSource {
    names: BTreeSet<String>,
    failure: Option<u16>,
    calls: Mutex<usize>,
}

impl StubLocationSource {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            failure: Some(status),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl LocationSource for StubLocationSource {
    async fn fetch_locations(&self) -> Result<BTreeSet<String>, SyncError> {
        *self.calls.lock() += 1;
        match self.failure {
            Some(status) => Err(SyncError::Status {
                endpoint: "stub://servicenow".to_string(),
                status,
                body: "stub failure".to_string(),
            }),
            None => Ok(self.names.clone()),
        }
    }
}

/// Attribute store keeping definitions in memory and recording every call.
#[derive(Default)]
pub struct MemoryAttributeStore {
    definitions: Mutex<HashMap<String, AttributeDefinition>>,
    reads: Mutex<Vec<String>>,
    updates: Mutex<Vec<(AttributeRef, Vec<String>)>>,
    update_failure: Option<u16>,
}

impl MemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition whose `_ref` is derived from its name.
    pub fn with_definition(self, name: &str, values: &[&str]) -> Self {
        let definition = AttributeDefinition {
            reference: Self::reference_for(name),
            values: values.iter().map(|value| value.to_string()).collect(),
        };
        self.definitions.lock().insert(name.to_string(), definition);
        self
    }

    /// Make every update fail with the given status.
    pub fn failing_updates(mut self, status: u16) -> Self {
        self.update_failure = Some(status);
        self
    }

    pub fn reference_for(name: &str) -> AttributeRef {
        AttributeRef::new(format!("extensibleattributedef/stub:{name}"))
    }

    pub fn values(&self, name: &str) -> Option<Vec<String>> {
        self.definitions
            .lock()
            .get(name)
            .map(|definition| definition.values.clone())
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().clone()
    }

    pub fn updates(&self) -> Vec<(AttributeRef, Vec<String>)> {
        self.updates.lock().clone()
    }
}

#[async_trait]
impl AttributeStore for MemoryAttributeStore {
    async fn read_definition(&self, name: &str) -> Result<AttributeDefinition, SyncError> {
        self.reads.lock().push(name.to_string());
        self.definitions
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(name.to_string()))
    }

    async fn replace_values(
        &self,
        reference: &AttributeRef,
        values: &[String],
    ) -> Result<(), SyncError> {
        self.updates
            .lock()
            .push((reference.clone(), values.to_vec()));
        if let Some(status) = self.update_failure {
            return Err(SyncError::Status {
                endpoint: format!("stub://infoblox/{reference}"),
                status,
                body: "stub failure".to_string(),
            });
        }
        let mut definitions = self.definitions.lock();
        let definition = definitions
            .values_mut()
            .find(|definition| &definition.reference == reference)
            .ok_or_else(|| SyncError::Status {
                endpoint: format!("stub://infoblox/{reference}"),
                status: 404,
                body: "unknown reference".to_string(),
            })?;
        definition.values = values.to_vec();
        Ok(())
    }
}
