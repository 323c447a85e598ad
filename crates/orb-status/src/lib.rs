//! The anchor status store and its GC/inspection monitor (§4.7).

pub mod inspector;
pub mod monitor;
pub mod record;
pub mod store;

pub use inspector::{CheckPolicyOutcome, Inspector};
pub use monitor::{Monitor, MonitorConfig};
pub use record::{Status, StatusRecord};
pub use store::StatusStore;
