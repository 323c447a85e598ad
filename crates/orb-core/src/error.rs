//! Error kind taxonomy shared by every pipeline crate.
//!
//! Mirrors the `StorageError`/`NetworkError` shape from the teacher's
//! `shared/crates/storage` and `shared/crates/networking` crates, but unifies
//! them behind one [`Kind`] sentinel per §7 of the design so callers can ask
//! "is this of kind K?" instead of downcasting concrete error types.

use std::fmt;

/// The error kinds named in §7: transient, not-found, integrity,
/// policy-unsatisfied, witnesses-not-found, expired, cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Network I/O, 5xx from peers, storage unavailable, broker publish
    /// failure. Callers retry with backoff.
    Transient,
    /// CAS miss exhausting all hints; status/config absent.
    NotFound,
    /// Local hash mismatch, signature verification failure, missing audit
    /// path. Fatal for the affected item only.
    Integrity,
    /// Witness-collection deadline reached without `Evaluate == true`.
    PolicyUnsatisfied,
    /// The policy inspector could not select any additional witnesses.
    WitnessesNotFound,
    /// A watched credential's deadline passed without confirmation.
    Expired,
    /// The caller's cancellation token fired; no retry.
    Cancelled,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Transient => "transient",
            Kind::NotFound => "not-found",
            Kind::Integrity => "integrity",
            Kind::PolicyUnsatisfied => "policy-unsatisfied",
            Kind::WitnessesNotFound => "witnesses-not-found",
            Kind::Expired => "expired",
            Kind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A wrapped error carrying a [`Kind`], a context message, and an optional
/// cause. The REST layer (out of scope here) maps `Kind` to status codes;
/// this crate only needs the predicate.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct OrbError {
    kind: Kind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl OrbError {
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: Kind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is(&self, kind: Kind) -> bool {
        self.kind == kind
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(Kind::Transient, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Kind::NotFound, message)
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::new(Kind::Integrity, message)
    }

    pub fn cancelled() -> Self {
        Self::new(Kind::Cancelled, "operation cancelled")
    }
}

pub type Result<T> = std::result::Result<T, OrbError>;

/// Extension used at call sites that need to ask "was this a transient
/// failure?" without matching on a concrete error enum (§7 propagation).
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

impl IsTransient for OrbError {
    fn is_transient(&self) -> bool {
        self.kind == Kind::Transient
    }
}
