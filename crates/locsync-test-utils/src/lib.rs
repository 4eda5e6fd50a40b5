//! Test helpers shared across locsync crates.

pub mod config;
pub mod infoblox;
pub mod server;
pub mod servicenow;
pub mod stubs;

pub use config::test_config;
pub use infoblox::{MockInfoblox, TEST_REFERENCE};
pub use server::{RecordedRequest, closed_endpoint};
pub use servicenow::MockServiceNow;
pub use stubs::{MemoryAttributeStore, StubLocationSource};
