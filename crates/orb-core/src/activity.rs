//! Activity-streams types (§3, §9): "variants are tagged (e.g. `Activity`
//! kinds {Create|Offer|Accept|Reject|Like|Follow|InviteWitness|Announce|Undo}
//! with a discriminator field and per-kind payloads)". No inheritance; one
//! enum, one variant per kind, each carrying only what that kind needs.

use serde::{Deserialize, Serialize};

/// The actor collaborator cached by the federation transport (§4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub iri: String,
    pub inbox: String,
    pub outbox: String,
    pub followers: String,
    pub witnesses: String,
    pub public_key_pem: String,
    pub key_id: String,
}

/// The anchor linkset object embedded in `Offer`/`Create` activities. Orb's
/// core treats the anchor credential as opaque (§1 Non-goals); this only
/// carries the hashlink and timing metadata the orchestrator needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorLinkset {
    pub hashlink: String,
    pub anchor_origin: Option<String>,
    /// The opaque, already-marshalled anchor credential bytes.
    pub credential: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayload {
    pub object: AnchorLinkset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferPayload {
    pub object: AnchorLinkset,
    pub target: Vec<String>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikePayload {
    pub object_hashlink: String,
    pub result: WitnessProofPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WitnessProofPayload {
    pub proof: Vec<u8>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptPayload {
    pub object_hashlink: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectPayload {
    pub object_hashlink: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowPayload {
    pub object_actor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncePayload {
    pub object_hashlink: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteWitnessPayload {
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoPayload {
    pub activity_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActivityPayload {
    Create(CreatePayload),
    Offer(OfferPayload),
    Accept(AcceptPayload),
    Reject(RejectPayload),
    Like(LikePayload),
    Follow(FollowPayload),
    Announce(AnnouncePayload),
    InviteWitness(InviteWitnessPayload),
    Undo(UndoPayload),
}

/// An activity as created in an outbox, delivered via transport, and stored
/// in an inbox (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub actor: String,
    pub to: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub payload: ActivityPayload,
}

impl Activity {
    pub fn kind(&self) -> &'static str {
        match &self.payload {
            ActivityPayload::Create(_) => "Create",
            ActivityPayload::Offer(_) => "Offer",
            ActivityPayload::Accept(_) => "Accept",
            ActivityPayload::Reject(_) => "Reject",
            ActivityPayload::Like(_) => "Like",
            ActivityPayload::Follow(_) => "Follow",
            ActivityPayload::Announce(_) => "Announce",
            ActivityPayload::InviteWitness(_) => "InviteWitness",
            ActivityPayload::Undo(_) => "Undo",
        }
    }
}
