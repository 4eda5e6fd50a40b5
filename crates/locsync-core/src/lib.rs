//! Core synchronization logic for locsync.
//!
//! The crate talks to two systems: ServiceNow, the source of truth for
//! location names, and Infoblox, which holds the `Location` extensible
//! attribute whose allowed values mirror those names. Both sides are
//! reached through traits ([`LocationSource`], [`AttributeStore`]) so the
//! [`Synchronizer`] and the flush workflow can run against test doubles.

pub mod error;
pub mod flush;
pub mod http;
pub mod infoblox;
pub mod location;
pub mod sanitize;
pub mod servicenow;
pub mod sync;
pub mod updater;

pub use error::SyncError;
pub use flush::{FlushReport, flush_attribute};
pub use infoblox::{AttributeDefinition, AttributeRef, AttributeStore, InfobloxClient};
pub use location::sort_locations;
pub use sanitize::{MAX_VALUE_LEN, SanitizeReport, sanitize_values};
pub use servicenow::{LocationSource, ServiceNowClient};
pub use sync::{SyncOutcome, SyncReport, SyncState, Synchronizer};
pub use updater::{AttributeUpdater, SENTINEL_VALUE, UpdateReport, ValueStrategy};
