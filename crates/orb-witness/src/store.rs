//! Per-anchor witness state (§3 "Witness", §4.5): the full candidate/
//! selection/proof list plus the unsigned anchor's payload and issuer
//! proof, persisted through the §6 `Store` collaborator so the orchestrator
//! and inspector can both read and mutate it across ticks.

use crate::policy::{PolicyConfig, Witness};
use chrono::{DateTime, Utc};
use orb_anchor::AnchorPayload;
use orb_core::error::{OrbError, Result};
use orb_core::store::{Store, Tag};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const NAMESPACE: &str = "anchor-witness-set";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorWitnessSet {
    pub anchor_id: String,
    pub created_at: DateTime<Utc>,
    pub payload: AnchorPayload,
    pub anchor_origin: Option<String>,
    pub issuer_proof: serde_json::Value,
    pub unsigned_hashlink: String,
    pub policy: PolicyConfig,
    pub witnesses: Vec<Witness>,
}

impl AnchorWitnessSet {
    pub fn selected(&self) -> impl Iterator<Item = &Witness> {
        self.witnesses.iter().filter(|w| w.selected)
    }
}

pub struct WitnessRecordStore {
    store: Arc<dyn Store>,
}

impl WitnessRecordStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn key(anchor_id: &str) -> String {
        format!("{NAMESPACE}:{anchor_id}")
    }

    pub async fn put(&self, set: &AnchorWitnessSet) -> Result<()> {
        let value = serde_json::to_vec(set)
            .map_err(|e| OrbError::integrity(format!("encode witness set: {e}")))?;
        self.store
            .put(
                &Self::key(&set.anchor_id),
                value,
                vec![Tag::str("anchorID", &set.anchor_id)],
            )
            .await
    }

    pub async fn get(&self, anchor_id: &str) -> Result<Option<AnchorWitnessSet>> {
        match self.store.get(&Self::key(anchor_id)).await? {
            Some(record) => Ok(Some(serde_json::from_slice(&record.value).map_err(|e| {
                OrbError::integrity(format!("decode witness set: {e}"))
            })?)),
            None => Ok(None),
        }
    }

    /// Load, mutate, and persist the set for `anchor_id` under a single
    /// call, returning the mutated value so callers don't need a second
    /// round trip.
    pub async fn update<F>(&self, anchor_id: &str, mutate: F) -> Result<AnchorWitnessSet>
    where
        F: FnOnce(&mut AnchorWitnessSet),
    {
        let mut set = self
            .get(anchor_id)
            .await?
            .ok_or_else(|| OrbError::not_found(format!("no witness set for anchor {anchor_id}")))?;
        mutate(&mut set);
        self.put(&set).await?;
        Ok(set)
    }
}
