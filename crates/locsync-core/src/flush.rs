//! Reset an attribute's enumeration to the sentinel placeholder.

use crate::{AttributeRef, AttributeStore, AttributeUpdater, SyncError, ValueStrategy};
use log::info;
use std::sync::Arc;

/// Summary of a flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushReport {
    pub attribute: String,
    pub reference: AttributeRef,
    /// Number of allowed values present before the flush.
    pub previous_count: usize,
    pub submitted: Vec<String>,
}

/// Replace every allowed value of `name` with the single sentinel value.
pub async fn flush_attribute(
    store: Arc<dyn AttributeStore>,
    name: &str,
) -> Result<FlushReport, SyncError> {
    info!("starting flush of EA '{name}'");
    let definition = store.read_definition(name).await?;
    let previous_count = definition.values.len();
    let update = AttributeUpdater::new(Arc::clone(&store))
        .apply(&definition.reference, ValueStrategy::Sentinel)
        .await?;
    info!("flush successful, EA '{name}' reduced from {previous_count} values to the placeholder");
    Ok(FlushReport {
        attribute: name.to_string(),
        reference: definition.reference,
        previous_count,
        submitted: update.submitted,
    })
}
