//! The witness-transparency-log proof monitor (§4.8): watches a sealed
//! anchor credential's inclusion promise against each logging witness's
//! Merkle tree until it is confirmed, expires, or fails verification.

pub mod ledger;
pub mod merkle;
pub mod monitor;
pub mod queue;

pub use ledger::{HttpLedgerClient, LedgerClient, SignedTreeHead, RECOGNIZED_LEDGER_TYPE};
pub use merkle::{leaf_hash, InclusionProof, InclusionProofStep};
pub use monitor::{Monitor, MonitorConfig};
pub use queue::{QueuedWatch, WatchQueue};
