//! The message broker collaborator (§6): `Publish(topic, msg)`,
//! `Subscribe(ctx, topic) -> stream`. Transient errors cause redelivery;
//! persistent errors are logged and the message dropped after N attempts.
//!
//! Grounded on the teacher's `NetworkMessage`/`broadcast_message` shape in
//! `shared/crates/networking/src/lib.rs`, generalized from direct P2P
//! broadcast to a topic-addressed pub/sub abstraction since the federation
//! transport (orb-transport) owns the actual wire hop.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An opaque message with correlation metadata, as delivered by `Subscribe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub correlation_id: String,
    pub topic: String,
    pub payload: Vec<u8>,
    pub delivery_attempt: u32,
}

/// A handle over an in-flight subscription; callers pull messages and ack
/// each one only after a durable commit (§5 backpressure).
#[async_trait]
pub trait Subscription: Send {
    async fn next(&mut self) -> Option<Message>;
    async fn ack(&mut self, message: &Message) -> Result<()>;
}

#[async_trait]
pub trait Broker: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
    async fn subscribe(&self, topic: &str) -> Result<Box<dyn Subscription>>;
}
