//! The concrete policy inspector (§4.6 "Inspector"), implementing
//! [`orb_status::Inspector`] so the status monitor can drive `CheckPolicy`
//! without depending on the witness policy engine or federation transport.

use crate::orchestrator::AnchorWriter;
use async_trait::async_trait;
use orb_core::error::Result;
use orb_core::metrics::MetricsSink;
use orb_status::{CheckPolicyOutcome, Inspector};
use std::sync::Arc;

pub struct PolicyInspector<M: MetricsSink> {
    writer: Arc<AnchorWriter<M>>,
}

impl<M: MetricsSink> PolicyInspector<M> {
    pub fn new(writer: Arc<AnchorWriter<M>>) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl<M: MetricsSink + 'static> Inspector for PolicyInspector<M> {
    /// "Re-select using the current excluded set (witnesses that were
    /// selected but failed to return a proof); compute the set difference
    /// against previously-selected witnesses; if non-empty, mark those new
    /// witnesses selected in the store and post a fresh Offer to them; else
    /// return ... witnesses-not-found" (§4.6).
    async fn check_policy(&self, anchor_id: &str) -> Result<CheckPolicyOutcome> {
        self.writer.check_policy(anchor_id).await
    }
}
