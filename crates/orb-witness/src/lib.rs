//! The anchor writer / witness orchestrator (§4.5) and the witness policy
//! DSL, engine, selector, and inspector (§4.6).

pub mod inspector;
pub mod orchestrator;
pub mod policy;
pub mod store;

pub use inspector::PolicyInspector;
pub use orchestrator::{
    AnchorWriter, AnchorWriterConfig, CoreIndexBuilder, ProofWatcher, SuffixAnchorIndex,
    WitnessDirectory,
};
pub use store::{AnchorWitnessSet, WitnessRecordStore};
