//! Metrics sink collaborator (§9 "Polymorphism": behavior-only, no concrete
//! exporter bundled — exporters are out of scope per §1, but the pipeline
//! always reports through this seam, never silently).

pub trait MetricsSink: Send + Sync {
    fn cache_hit(&self, _cache: &str) {}
    fn cache_miss(&self, _cache: &str) {}
    fn batch_cut(&self, _size: usize, _duration: std::time::Duration) {}
    fn batch_rollback(&self) {}
    fn gc_swept(&self, _namespace: &str, _count: usize) {}
    /// Witnesses selected for an anchor, split by class (§4.6 `Select`).
    fn witnesses_selected(&self, _batch: usize, _system: usize) {}
    /// The witness policy evaluated true and the anchor was sealed (§4.5).
    fn anchor_sealed(&self, _elapsed: std::time::Duration) {}
    /// The inspector could not find replacement witnesses; the anchor was
    /// abandoned (§4.6, §4.7).
    fn anchor_abandoned(&self) {}
    /// A witness's inclusion proof was confirmed or found expired (§4.8).
    fn proof_confirmed(&self) {}
    fn proof_expired(&self) {}
}

/// A sink that discards everything; the default when no exporter is wired.
#[derive(Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {}
