//! ServiceNow -> Infoblox synchronizer.
//!
//! One run walks `Idle -> FetchedDesired -> ReadCurrent`, then either stops
//! at `NoChangeNeeded` or goes through `Updating -> Verified`, and always
//! finishes in `Done`. There is no rollback: a failed run is simply rerun,
//! and the diff is recomputed from both systems.

use crate::location::sort_locations;
use crate::sanitize::sanitized_set;
use crate::{
    AttributeStore, AttributeUpdater, LocationSource, SyncError, UpdateReport, ValueStrategy,
};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

/// States of a single synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    FetchedDesired,
    ReadCurrent,
    NoChangeNeeded,
    Updating,
    Verified,
    Done,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The attribute already matched the source; nothing was written.
    NoChange,
    /// The values were replaced and read back.
    Updated {
        update: UpdateReport,
        /// Values read back after the update. Logged, not asserted.
        verified_values: BTreeSet<String>,
    },
}

/// Summary of a synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub attribute: String,
    /// Desired values in country/city/campus order.
    pub desired: Vec<String>,
    /// Values configured before the run.
    pub current: BTreeSet<String>,
    pub outcome: SyncOutcome,
    /// Every state the run passed through, starting at `Idle`.
    pub states: Vec<SyncState>,
}

impl SyncReport {
    pub fn changed(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Updated { .. })
    }
}

/// Orchestrates fetch, read, diff, update and verification.
pub struct Synchronizer {
    source: Arc<dyn LocationSource>,
    store: Arc<dyn AttributeStore>,
    attribute_name: String,
}

impl Synchronizer {
    pub fn new(
        source: Arc<dyn LocationSource>,
        store: Arc<dyn AttributeStore>,
        attribute_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            attribute_name: attribute_name.into(),
        }
    }

    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let name = self.attribute_name.as_str();
        let mut states = vec![SyncState::Idle];
        info!("starting ServiceNow -> Infoblox synchronization for EA '{name}'");

        let desired = self.source.fetch_locations().await?;
        advance(&mut states, SyncState::FetchedDesired);

        let definition = self.store.read_definition(name).await?;
        let current = definition.value_set();
        advance(&mut states, SyncState::ReadCurrent);
        info!("current Infoblox EA '{name}' allowed values: {current:?}");

        let ordered = sort_locations(desired.iter().cloned());
        info!(
            "ServiceNow provided {} allowed values: {ordered:?}",
            ordered.len()
        );

        // Compared as sets of stored values: order is irrelevant and the
        // remote side only ever holds truncated values.
        let outcome = if sanitized_set(&desired) == current {
            advance(&mut states, SyncState::NoChangeNeeded);
            info!("no changes required, Infoblox EA allowed values are up-to-date");
            SyncOutcome::NoChange
        } else {
            advance(&mut states, SyncState::Updating);
            info!("updating Infoblox EA allowed values to match ServiceNow data");
            let update = AttributeUpdater::new(Arc::clone(&self.store))
                .apply(
                    &definition.reference,
                    ValueStrategy::FromSource(ordered.clone()),
                )
                .await?;

            let after = self.store.read_definition(name).await?;
            let verified_values = after.value_set();
            advance(&mut states, SyncState::Verified);
            info!("after update, Infoblox EA '{name}' allowed values: {verified_values:?}");
            let submitted: BTreeSet<String> = update.submitted.iter().cloned().collect();
            if submitted != verified_values {
                warn!("values read back for EA '{name}' differ from the submitted list");
            }
            SyncOutcome::Updated {
                update,
                verified_values,
            }
        };

        advance(&mut states, SyncState::Done);
        info!("synchronization completed successfully");
        Ok(SyncReport {
            attribute: name.to_string(),
            desired: ordered,
            current,
            outcome,
            states,
        })
    }
}

fn advance(states: &mut Vec<SyncState>, next: SyncState) {
    debug!(
        "sync state {:?} -> {next:?}",
        states.last().copied().unwrap_or(SyncState::Idle)
    );
    states.push(next);
}
