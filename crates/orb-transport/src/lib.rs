pub mod actor_cache;
pub mod client;
pub mod signer;
pub mod webfinger;

pub use client::{CallKind, Request, Response, Transport, TransportError};
pub use signer::{AlwaysAuth, AuthPolicy, Ed25519Signer, Method, NeverAuth, NoopSigner, Signer};
pub use webfinger::{WebFingerClient, WebFingerLink, WebFingerResponse};
