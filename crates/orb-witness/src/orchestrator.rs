//! The anchor writer / witness orchestrator (§4.5): the happy path from a
//! cut batch to a sealed, witnessed anchor credential. Implements
//! [`orb_opqueue::BatchSink`] so a `Cutter` can drive it directly, and
//! drives [`orb_status::Inspector::check_policy`] for the status monitor.
//!
//! Three collaborators the spec names but leaves out of scope are declared
//! here as trait seams rather than inlined: the bulk previous-anchor lookup
//! ([`SuffixAnchorIndex`]), the Sidetree core-index builder
//! ([`CoreIndexBuilder`]), and the witness candidate directory
//! ([`WitnessDirectory`]). [`ProofWatcher`] is the matching seam for §4.8 —
//! `orb-vct`'s monitor implements it so this crate never depends on vct.

use crate::policy::{PolicyConfigStore, PolicyEngine, UniformRandomSelector, Witness, WitnessClass, WitnessSelector};
use crate::store::{AnchorWitnessSet, WitnessRecordStore};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use orb_anchor::{AnchorCredential, AnchorGraph, AnchorPayload};
use orb_core::activity::{
    Activity, ActivityPayload, Actor, AnchorLinkset, CreatePayload, OfferPayload, WitnessProofPayload,
};
use orb_core::broker::Broker;
use orb_core::cancel::CancelToken;
use orb_core::error::{OrbError, Result};
use orb_core::keys::KeyProvider;
use orb_core::metrics::MetricsSink;
use orb_opqueue::{BatchSink, Operation};
use orb_status::{CheckPolicyOutcome, StatusStore};
use orb_transport::{ActorCache, CallKind, Request, Transport};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

/// `GetPreviousAnchors(suffixes) -> { suffix: hashlink }` (§4.5 step 1 "bulk
/// lookup"). Absent entries mean the suffix's create operation.
#[async_trait]
pub trait SuffixAnchorIndex: Send + Sync {
    async fn previous_anchors(&self, suffixes: &[String]) -> Result<BTreeMap<String, String>>;
}

/// Builds the Sidetree core index for a cut batch and returns its hashlink.
/// The core index's own structure is out of scope here (§1 Non-goals);
/// this crate only needs the resulting hashlink for the anchor payload.
#[async_trait]
pub trait CoreIndexBuilder: Send + Sync {
    async fn build(&self, operations: &[Operation]) -> Result<String>;
}

/// The configured witness candidate pool an anchor draws `Select` from.
/// Discovery/registration of witnesses is out of scope (§1); this crate
/// only needs the resulting list.
#[async_trait]
pub trait WitnessDirectory: Send + Sync {
    async fn candidates(&self) -> Result<Vec<Witness>>;
}

/// `Watch(vc, deadline, witnessDomain, createdAt)` (§4.8 step 0): called
/// once per witnessed anchor after sealing, one call per witness domain
/// that ran a verifiable log.
#[async_trait]
pub trait ProofWatcher: Send + Sync {
    async fn watch(
        &self,
        vc_bytes: Vec<u8>,
        deadline: DateTime<Utc>,
        witness_domain: String,
        created_at: DateTime<Utc>,
    ) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct AnchorWriterConfig {
    pub namespace: String,
    pub protocol_version: u32,
    /// `maxWitnessDelay` (§4.5 step 2): the deadline budget for witness
    /// collection before `Fail` applies.
    pub max_witness_delay: Duration,
    /// `δ`, the slack added on top of `maxWitnessDelay` (§4.5 step 2).
    pub delta: Duration,
    pub policy_key: String,
    pub issuer_key_id: String,
    /// This node's actor IRI, used as the anchor origin and `Offer`/`Create`
    /// activity actor.
    pub actor_iri: String,
    /// The well-known public collection recipients are posted to alongside
    /// selected witnesses (§4.5 step 4).
    pub public_iri: String,
}

pub struct AnchorWriter<M: MetricsSink> {
    graph: Arc<AnchorGraph>,
    status_store: Arc<StatusStore>,
    witness_store: Arc<WitnessRecordStore>,
    policy_config_store: Arc<PolicyConfigStore>,
    suffix_index: Arc<dyn SuffixAnchorIndex>,
    core_index_builder: Arc<dyn CoreIndexBuilder>,
    witness_directory: Arc<dyn WitnessDirectory>,
    transport: Arc<Transport>,
    key_provider: Arc<dyn KeyProvider>,
    actor_cache: Arc<ActorCache<M>>,
    broker: Arc<dyn Broker>,
    proof_watcher: Option<Arc<dyn ProofWatcher>>,
    selector: Arc<dyn WitnessSelector>,
    metrics: Arc<M>,
    config: AnchorWriterConfig,
    locks: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl<M: MetricsSink> AnchorWriter<M> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph: Arc<AnchorGraph>,
        status_store: Arc<StatusStore>,
        witness_store: Arc<WitnessRecordStore>,
        policy_config_store: Arc<PolicyConfigStore>,
        suffix_index: Arc<dyn SuffixAnchorIndex>,
        core_index_builder: Arc<dyn CoreIndexBuilder>,
        witness_directory: Arc<dyn WitnessDirectory>,
        transport: Arc<Transport>,
        key_provider: Arc<dyn KeyProvider>,
        actor_cache: Arc<ActorCache<M>>,
        broker: Arc<dyn Broker>,
        proof_watcher: Option<Arc<dyn ProofWatcher>>,
        metrics: Arc<M>,
        config: AnchorWriterConfig,
    ) -> Self {
        Self {
            graph,
            status_store,
            witness_store,
            policy_config_store,
            suffix_index,
            core_index_builder,
            witness_directory,
            transport,
            key_provider,
            actor_cache,
            broker,
            proof_watcher,
            selector: Arc::new(UniformRandomSelector),
            metrics,
            config,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, anchor_id: &str) -> Arc<AsyncMutex<()>> {
        self.locks
            .entry(anchor_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// §4.5 steps 1-4: build, store-initial, select, offer.
    pub async fn build_and_offer(&self, operations: Vec<Operation>) -> Result<String> {
        let mut suffixes: Vec<String> = operations.iter().map(|op| op.suffix.clone()).collect();
        suffixes.sort();
        suffixes.dedup();

        let previous_anchors = self.suffix_index.previous_anchors(&suffixes).await?;
        let core_index_hash = self.core_index_builder.build(&operations).await?;

        let payload = AnchorPayload {
            namespace: self.config.namespace.clone(),
            protocol_version: self.config.protocol_version,
            core_index_hash,
            operation_count: operations.len() as u32,
            previous_anchors,
        };
        let payload_bytes = serde_json::to_vec(&payload)
            .map_err(|e| OrbError::integrity(format!("encode anchor payload: {e}")))?;
        let issuer_signature = self
            .key_provider
            .sign(&self.config.issuer_key_id, &payload_bytes)
            .await?;
        let issuer_proof = issuer_proof_value(&self.config.issuer_key_id, &issuer_signature);

        let credential = AnchorCredential {
            payload: payload.clone(),
            proofs: vec![issuer_proof.clone()],
        };
        let anchor_id = Uuid::new_v4().to_string();
        let unsigned_hashlink = self
            .graph
            .write(Some(self.config.actor_iri.clone()), &credential)
            .await?;

        let created_at = Utc::now();
        let deadline = created_at
            + ChronoDuration::from_std(self.config.max_witness_delay).unwrap_or_default()
            + ChronoDuration::from_std(self.config.delta).unwrap_or_default();
        self.status_store.add_in_process(&anchor_id, deadline).await?;

        let policy = self.policy_config_store.get(&self.config.policy_key).await?;
        let mut candidates = self.witness_directory.candidates().await?;
        let engine = PolicyEngine::new(policy.clone());
        let selected = engine.select(&candidates, &[], self.selector.as_ref());
        for witness in candidates.iter_mut() {
            witness.selected = selected.iter().any(|uri| uri == &witness.uri);
        }
        self.metrics.witnesses_selected(
            selected_count(&candidates, WitnessClass::Batch),
            selected_count(&candidates, WitnessClass::System),
        );

        let witness_set = AnchorWitnessSet {
            anchor_id: anchor_id.clone(),
            created_at,
            payload,
            anchor_origin: Some(self.config.actor_iri.clone()),
            issuer_proof,
            unsigned_hashlink: unsigned_hashlink.clone(),
            policy,
            witnesses: candidates,
        };
        self.witness_store.put(&witness_set).await?;

        self.offer(&witness_set, &selected, created_at, deadline)
            .await;
        Ok(anchor_id)
    }

    /// Posts an `Offer` activity carrying the unsigned anchor linkset to
    /// `targets` and the public IRI (§4.5 step 4). Best-effort: a failed
    /// delivery is logged, not fatal, since outbox retry is out of scope
    /// here (§5 "the outbox never loses an activity under non-Byzantine
    /// failure" names a durable queue this crate doesn't implement).
    async fn offer(
        &self,
        witness_set: &AnchorWitnessSet,
        targets: &[String],
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) {
        let credential_bytes = match serde_json::to_vec(&AnchorCredential {
            payload: witness_set.payload.clone(),
            proofs: vec![witness_set.issuer_proof.clone()],
        }) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(anchor_id = %witness_set.anchor_id, error = %e, "failed to marshal offer object");
                return;
            }
        };
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            actor: self.config.actor_iri.clone(),
            to: targets
                .iter()
                .cloned()
                .chain(std::iter::once(self.config.public_iri.clone()))
                .collect(),
            created_at: start_time,
            payload: ActivityPayload::Offer(OfferPayload {
                object: AnchorLinkset {
                    hashlink: witness_set.unsigned_hashlink.clone(),
                    anchor_origin: witness_set.anchor_origin.clone(),
                    credential: credential_bytes,
                },
                target: targets.to_vec(),
                start_time,
                end_time,
            }),
        };
        let body = match serde_json::to_vec(&activity) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(anchor_id = %witness_set.anchor_id, error = %e, "failed to marshal offer activity");
                return;
            }
        };

        for recipient in targets {
            self.deliver(recipient, &body).await;
        }
        self.post_public(&self.config.public_iri.clone(), &body).await;
    }

    async fn deliver(&self, witness_uri: &str, body: &[u8]) {
        match self.fetch_actor(witness_uri).await {
            Ok(actor) => self.post_public(&actor.inbox, body).await,
            Err(e) => {
                tracing::warn!(witness = witness_uri, error = %e, "failed to resolve witness actor for offer");
            }
        }
    }

    async fn post_public(&self, inbox: &str, body: &[u8]) {
        let cancel = CancelToken::new();
        if let Err(e) = self
            .transport
            .post(&cancel, Request::new(inbox), body, CallKind::Federation)
            .await
        {
            tracing::warn!(inbox, error = %e, "activity delivery failed");
        }
    }

    async fn fetch_actor(&self, iri: &str) -> Result<Actor> {
        let transport = self.transport.clone();
        let iri_owned = iri.to_string();
        self.actor_cache
            .get_actor(iri, move || async move {
                let cancel = CancelToken::new();
                let response = transport
                    .get(&cancel, Request::new(iri_owned.clone()), CallKind::Federation)
                    .await
                    .map_err(|e| OrbError::transient(format!("actor fetch failed: {e}")))?;
                serde_json::from_slice(&response.body)
                    .map_err(|e| OrbError::integrity(format!("malformed actor document: {e}")))
            })
            .await
    }

    /// §4.5 step 5 + ordering note: serialized per anchor-id, idempotent on
    /// duplicate proofs from the same witness, discards unverifiable
    /// proofs. Runs `Evaluate` after a successful attach and seals on the
    /// first `true`.
    pub async fn attach_proof(
        &self,
        anchor_id: &str,
        witness_uri: &str,
        proof: WitnessProofPayload,
    ) -> Result<()> {
        let lock = self.lock_for(anchor_id);
        let _guard = lock.lock().await;

        let mut witness_set = self
            .witness_store
            .get(anchor_id)
            .await?
            .ok_or_else(|| OrbError::not_found(format!("no witness set for anchor {anchor_id}")))?;

        let Some(witness) = witness_set
            .witnesses
            .iter_mut()
            .find(|w| w.uri == witness_uri && w.selected)
        else {
            tracing::warn!(anchor_id, witness = witness_uri, "proof from unselected witness ignored");
            return Ok(());
        };
        if witness.proof.is_some() {
            return Ok(()); // duplicate, idempotent
        }

        let actor = self.fetch_actor(witness_uri).await?;
        let verified = self
            .key_provider
            .verify(&actor.key_id, witness_set.unsigned_hashlink.as_bytes(), &proof.proof)
            .await?;
        if !verified {
            tracing::warn!(anchor_id, witness = witness_uri, "unverifiable witness proof discarded");
            return Ok(());
        }

        witness.proof = Some(crate::policy::WitnessProof {
            witness_uri: witness_uri.to_string(),
            signature: proof.proof,
            completed_at: proof.completed_at,
        });
        self.witness_store.put(&witness_set).await?;

        let engine = PolicyEngine::new(witness_set.policy.clone());
        if engine.evaluate(&witness_set.witnesses) {
            self.seal(anchor_id).await?;
        }
        Ok(())
    }

    /// §4.5 step 6: rewrite with all proofs, publish, notify, complete.
    pub async fn seal(&self, anchor_id: &str) -> Result<()> {
        let started = Instant::now();
        let witness_set = self
            .witness_store
            .get(anchor_id)
            .await?
            .ok_or_else(|| OrbError::not_found(format!("no witness set for anchor {anchor_id}")))?;

        let mut proofs = vec![witness_set.issuer_proof.clone()];
        proofs.extend(
            witness_set
                .witnesses
                .iter()
                .filter_map(|w| w.proof.as_ref())
                .map(|p| witness_proof_value(&p.witness_uri, &p.signature, p.completed_at)),
        );
        let sealed = AnchorCredential {
            payload: witness_set.payload.clone(),
            proofs,
        };
        let sealed_hashlink = self
            .graph
            .write(witness_set.anchor_origin.clone(), &sealed)
            .await?;

        let sealed_bytes = sealed.to_bytes()?;
        let create = Activity {
            id: Uuid::new_v4().to_string(),
            actor: self.config.actor_iri.clone(),
            to: vec![self.config.public_iri.clone()],
            created_at: Utc::now(),
            payload: ActivityPayload::Create(CreatePayload {
                object: AnchorLinkset {
                    hashlink: sealed_hashlink.clone(),
                    anchor_origin: witness_set.anchor_origin.clone(),
                    credential: sealed_bytes.clone(),
                },
            }),
        };
        let create_body = serde_json::to_vec(&create)
            .map_err(|e| OrbError::integrity(format!("encode create activity: {e}")))?;
        self.post_public(&self.config.public_iri.clone(), &create_body).await;

        self.broker
            .publish("orb.anchor.completed", sealed_hashlink.clone().into_bytes())
            .await?;
        self.status_store.mark_completed(anchor_id).await?;
        self.metrics.anchor_sealed(started.elapsed());

        if let Some(watcher) = &self.proof_watcher {
            let deadline = self
                .status_store
                .get_status(anchor_id)
                .await
                .ok()
                .flatten()
                .map(|s| s.deadline)
                .unwrap_or(witness_set.created_at);
            for witness in witness_set.witnesses.iter().filter(|w| w.counts_toward(witness_set.policy.log_required)) {
                if let Some(domain) = host_of(&witness.uri) {
                    if let Err(e) = watcher
                        .watch(sealed_bytes.clone(), deadline, domain, witness_set.created_at)
                        .await
                    {
                        tracing::warn!(anchor_id, witness = %witness.uri, error = %e, "failed to register proof watch");
                    }
                }
            }
        }
        Ok(())
    }

    /// §4.6 `CheckPolicy`, driven by [`orb_status::Monitor`] through
    /// [`crate::inspector::PolicyInspector`].
    pub async fn check_policy(&self, anchor_id: &str) -> Result<CheckPolicyOutcome> {
        let lock = self.lock_for(anchor_id);
        let _guard = lock.lock().await;

        let mut witness_set = self
            .witness_store
            .get(anchor_id)
            .await?
            .ok_or_else(|| OrbError::not_found(format!("no witness set for anchor {anchor_id}")))?;

        let previously_selected: Vec<String> = witness_set
            .witnesses
            .iter()
            .filter(|w| w.selected)
            .map(|w| w.uri.clone())
            .collect();
        let excluded: Vec<String> = witness_set
            .witnesses
            .iter()
            .filter(|w| w.selected && w.proof.is_none())
            .map(|w| w.uri.clone())
            .collect();

        let engine = PolicyEngine::new(witness_set.policy.clone());
        let reselected = engine.select(&witness_set.witnesses, &excluded, self.selector.as_ref());
        let fresh: Vec<String> = reselected
            .into_iter()
            .filter(|uri| !previously_selected.contains(uri))
            .collect();
        if fresh.is_empty() {
            return Ok(CheckPolicyOutcome::WitnessesNotFound);
        }

        for witness in witness_set.witnesses.iter_mut() {
            if fresh.contains(&witness.uri) {
                witness.selected = true;
            }
        }
        self.witness_store.put(&witness_set).await?;

        let status = self.status_store.get_status(anchor_id).await?;
        let deadline = status.map(|s| s.deadline).unwrap_or_else(Utc::now);
        self.offer(&witness_set, &fresh, Utc::now(), deadline).await;

        Ok(CheckPolicyOutcome::Reselected(fresh))
    }
}

#[async_trait]
impl<M: MetricsSink> BatchSink for AnchorWriter<M> {
    async fn cut(&self, operations: Vec<Operation>) -> Result<()> {
        self.build_and_offer(operations).await.map(|_| ())
    }
}

fn selected_count(witnesses: &[Witness], class: WitnessClass) -> usize {
    witnesses.iter().filter(|w| w.class == class && w.selected).count()
}

fn issuer_proof_value(key_id: &str, signature: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "type": "Ed25519Signature2020",
        "role": "issuer",
        "verificationMethod": key_id,
        "proofValue": STANDARD.encode(signature),
    })
}

fn witness_proof_value(witness_uri: &str, signature: &[u8], completed_at: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "type": "Ed25519Signature2020",
        "role": "witness",
        "witness": witness_uri,
        "proofValue": STANDARD.encode(signature),
        "completedAt": completed_at,
    })
}

fn host_of(uri: &str) -> Option<String> {
    url::Url::parse(uri).ok().and_then(|u| u.host_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyConfigStore;
    use orb_anchor::{AnchorGraph, CompressionConfig};
    use orb_core::cas::MemoryCas;
    use orb_core::error::Kind;
    use orb_core::metrics::NoopMetrics;
    use orb_core::store::MemoryStore;
    use orb_hashlink::Resolver;
    use orb_opqueue::Operation;
    use orb_status::StatusStore;
    use orb_transport::signer::{NeverAuth, NoopSigner};
    use std::collections::BTreeMap;

    struct NullSuffixIndex;
    #[async_trait]
    impl SuffixAnchorIndex for NullSuffixIndex {
        async fn previous_anchors(&self, _suffixes: &[String]) -> Result<BTreeMap<String, String>> {
            Ok(BTreeMap::new())
        }
    }

    struct FixedCoreIndex;
    #[async_trait]
    impl CoreIndexBuilder for FixedCoreIndex {
        async fn build(&self, _operations: &[Operation]) -> Result<String> {
            Ok("hl:core-index".to_string())
        }
    }

    struct FixedDirectory {
        candidates: Vec<Witness>,
    }
    #[async_trait]
    impl WitnessDirectory for FixedDirectory {
        async fn candidates(&self) -> Result<Vec<Witness>> {
            Ok(self.candidates.clone())
        }
    }

    struct StubKeys;
    #[async_trait]
    impl KeyProvider for StubKeys {
        async fn sign(&self, _key_id: &str, bytes: &[u8]) -> Result<Vec<u8>> {
            Ok(bytes.to_vec())
        }
        async fn verify(&self, _key_id: &str, bytes: &[u8], signature: &[u8]) -> Result<bool> {
            Ok(bytes == signature)
        }
        async fn export_public_key(&self, _key_id: &str) -> Result<String> {
            Ok("pem".to_string())
        }
    }

    struct NoopBroker;
    #[async_trait]
    impl Broker for NoopBroker {
        async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<()> {
            Ok(())
        }
        async fn subscribe(&self, _topic: &str) -> Result<Box<dyn orb_core::broker::Subscription>> {
            unimplemented!("not exercised by the orchestrator")
        }
    }

    async fn writer(
        candidates: Vec<Witness>,
        policy_dsl: &str,
    ) -> AnchorWriter<NoopMetrics> {
        let cas = Arc::new(MemoryCas::new());
        let resolver = Arc::new(Resolver::new(cas, None, reqwest::Client::new(), "https://node.example", false));
        let graph = Arc::new(AnchorGraph::new(resolver, CompressionConfig { enabled: false }));
        let status_store = Arc::new(StatusStore::new(Arc::new(MemoryStore::new())));
        let witness_store = Arc::new(WitnessRecordStore::new(Arc::new(MemoryStore::new())));
        let policy_store_backing: Arc<dyn orb_core::store::Store> = Arc::new(MemoryStore::new());
        let policy_config_store = Arc::new(PolicyConfigStore::new(policy_store_backing, Duration::from_secs(60)));
        let metrics = Arc::new(NoopMetrics);
        let transport = Arc::new(Transport::new(
            Arc::new(NoopSigner),
            Arc::new(NoopSigner),
            Arc::new(NeverAuth),
            Duration::from_millis(50),
        ));
        let actor_cache = Arc::new(ActorCache::new(16, Duration::from_secs(60), metrics.clone()));

        policy_config_store.update("default", policy_dsl).await.unwrap();

        AnchorWriter::new(
            graph,
            status_store,
            witness_store,
            policy_config_store,
            Arc::new(NullSuffixIndex),
            Arc::new(FixedCoreIndex),
            Arc::new(FixedDirectory { candidates }),
            transport,
            Arc::new(StubKeys),
            actor_cache,
            Arc::new(NoopBroker),
            None,
            metrics,
            AnchorWriterConfig {
                namespace: "orb.example".to_string(),
                protocol_version: 1,
                max_witness_delay: Duration::from_secs(3600),
                delta: Duration::from_secs(60),
                policy_key: "default".to_string(),
                issuer_key_id: "issuer-key".to_string(),
                actor_iri: "https://node.example/actor".to_string(),
                public_iri: "https://node.example/public".to_string(),
            },
        )
    }

    fn op(suffix: &str) -> Operation {
        Operation {
            suffix: suffix.to_string(),
            operation_type: "create".to_string(),
            payload: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn build_and_offer_marks_witnesses_selected_and_admits_status() {
        let candidates = vec![
            Witness::candidate("https://w1.example/actor", WitnessClass::Batch, true),
            Witness::candidate("https://w2.example/actor", WitnessClass::Batch, true),
        ];
        let writer = writer(candidates, "MinNumberBatch=1").await;
        let anchor_id = writer.build_and_offer(vec![op("suffix-a")]).await.unwrap();

        let witness_set = writer.witness_store.get(&anchor_id).await.unwrap().unwrap();
        assert_eq!(witness_set.witnesses.iter().filter(|w| w.selected).count(), 1);

        let status = writer.status_store.get_status(&anchor_id).await.unwrap();
        assert!(status.is_some());
    }

    #[tokio::test]
    async fn attach_proof_from_unselected_witness_is_ignored() {
        let candidates = vec![Witness::candidate("https://w1.example/actor", WitnessClass::Batch, true)];
        let writer = writer(candidates, "MinNumberBatch=5").await;
        let anchor_id = writer.build_and_offer(vec![op("suffix-a")]).await.unwrap();

        let result = writer
            .attach_proof(
                &anchor_id,
                "https://unknown.example/actor",
                WitnessProofPayload {
                    proof: vec![1, 2, 3],
                    completed_at: Utc::now(),
                },
            )
            .await;
        assert!(result.is_ok());
        let witness_set = writer.witness_store.get(&anchor_id).await.unwrap().unwrap();
        assert!(witness_set.witnesses.iter().all(|w| w.proof.is_none()));
    }

    #[tokio::test]
    async fn check_policy_on_unknown_anchor_is_not_found() {
        let writer = writer(vec![], "MinNumberBatch=0").await;
        let err = writer.check_policy("missing-anchor").await.unwrap_err();
        assert!(err.is(Kind::NotFound));
    }

    #[tokio::test]
    async fn check_policy_with_no_remaining_candidates_reports_witnesses_not_found() {
        let candidates = vec![Witness::candidate("https://w1.example/actor", WitnessClass::Batch, true)];
        let writer = writer(candidates, "MinNumberBatch=1").await;
        let anchor_id = writer.build_and_offer(vec![op("suffix-a")]).await.unwrap();

        let outcome = writer.check_policy(&anchor_id).await.unwrap();
        assert!(matches!(outcome, CheckPolicyOutcome::WitnessesNotFound));
    }
}
