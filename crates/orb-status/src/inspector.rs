//! The inspector collaborator seam (§4.6 "Inspector", §4.7 "Monitor"). The
//! concrete policy inspector lives in `orb-witness` (it needs the witness
//! policy engine and the federation transport); this crate only declares
//! the behavior-only interface the monitor drives, per §9 "Polymorphism"
//! ("component collaborators ... are behavior-only interfaces").

use async_trait::async_trait;
use orb_core::error::Result;

/// The result of re-running `CheckPolicy` for a stalled anchor (§4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckPolicyOutcome {
    /// New witnesses were selected (and already offered); the uris are
    /// informational for logging.
    Reselected(Vec<String>),
    /// The policy could not select any additional witnesses; the anchor
    /// should be abandoned (§7 "Witnesses-not-found").
    WitnessesNotFound,
}

#[async_trait]
pub trait Inspector: Send + Sync {
    async fn check_policy(&self, anchor_id: &str) -> Result<CheckPolicyOutcome>;
}
