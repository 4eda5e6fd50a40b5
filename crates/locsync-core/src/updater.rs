//! Shared updater for the sync and flush workflows.

use crate::sanitize::{SanitizeReport, sanitize_values};
use crate::{AttributeRef, AttributeStore, SyncError};
use log::info;
use std::sync::Arc;

/// Placeholder written by a flush; the WAPI refuses an empty list.
pub const SENTINEL_VALUE: &str = "CLEARED";

/// Where the replacement values come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueStrategy {
    /// Raw values computed from the source system; sanitized before sending.
    FromSource(Vec<String>),
    /// The fixed [`SENTINEL_VALUE`], sent as-is.
    Sentinel,
}

/// What an update actually submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// The list sent to the store, in submission order.
    pub submitted: Vec<String>,
    /// Sanitization findings; `None` for the sentinel strategy.
    pub sanitization: Option<SanitizeReport>,
}

/// Replaces an attribute's allowed values wholesale.
#[derive(Clone)]
pub struct AttributeUpdater {
    store: Arc<dyn AttributeStore>,
}

impl AttributeUpdater {
    pub fn new(store: Arc<dyn AttributeStore>) -> Self {
        Self { store }
    }

    /// Resolve the strategy into a payload and submit it in one request.
    pub async fn apply(
        &self,
        reference: &AttributeRef,
        strategy: ValueStrategy,
    ) -> Result<UpdateReport, SyncError> {
        let (submitted, sanitization) = match strategy {
            ValueStrategy::FromSource(raw) => {
                let report = sanitize_values(&raw);
                (report.values.clone(), Some(report))
            }
            ValueStrategy::Sentinel => (vec![SENTINEL_VALUE.to_string()], None),
        };
        info!(
            "replacing allowed values of {reference} with {} entries",
            submitted.len()
        );
        self.store.replace_values(reference, &submitted).await?;
        Ok(UpdateReport {
            submitted,
            sanitization,
        })
    }
}
