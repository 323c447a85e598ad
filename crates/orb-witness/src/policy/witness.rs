//! The `Witness` and `WitnessProof` entities (§3). A witness record carries
//! its own `selected`/`proof` state rather than being split across
//! "candidate" and "selected" lists, so `Select` and `Evaluate` both work
//! off one list per anchor and the percent-of-total basis (§4.6) is always
//! the full candidate pool recorded at build time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WitnessClass {
    Batch,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WitnessProof {
    pub witness_uri: String,
    pub signature: Vec<u8>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    pub uri: String,
    pub class: WitnessClass,
    pub has_log: bool,
    pub selected: bool,
    pub proof: Option<WitnessProof>,
}

impl Witness {
    pub fn candidate(uri: impl Into<String>, class: WitnessClass, has_log: bool) -> Self {
        Self {
            uri: uri.into(),
            class,
            has_log,
            selected: false,
            proof: None,
        }
    }

    /// A proof counts toward a policy's minimum only if it exists and, when
    /// `LogRequired`, the witness runs a log (§4.6 `Evaluate`).
    pub fn counts_toward(&self, log_required: bool) -> bool {
        self.selected && self.proof.is_some() && (!log_required || self.has_log)
    }
}
