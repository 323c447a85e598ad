pub mod config_store;
pub mod dsl;
pub mod engine;
pub mod selector;
pub mod witness;

pub use config_store::PolicyConfigStore;
pub use engine::{Operator, PolicyConfig, PolicyEngine};
pub use selector::{DeterministicSelector, UniformRandomSelector, WitnessSelector};
pub use witness::{Witness, WitnessClass, WitnessProof};
