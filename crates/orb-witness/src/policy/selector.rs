//! The pluggable witness selector (§4.6 `Select`: "choose the minimum
//! number of each class using a pluggable selector (default: uniform
//! random without replacement)").

use super::witness::Witness;
use rand::seq::SliceRandom;

pub trait WitnessSelector: Send + Sync {
    /// Choose `count` witnesses out of `eligible` (already filtered for
    /// exclusion and `LogRequired`). `count` may exceed `eligible.len()`,
    /// in which case every eligible witness is returned.
    fn choose(&self, eligible: &[Witness], count: usize) -> Vec<String>;
}

#[derive(Default)]
pub struct UniformRandomSelector;

impl WitnessSelector for UniformRandomSelector {
    fn choose(&self, eligible: &[Witness], count: usize) -> Vec<String> {
        let mut pool: Vec<&Witness> = eligible.iter().collect();
        pool.shuffle(&mut rand::thread_rng());
        pool.into_iter().take(count).map(|w| w.uri.clone()).collect()
    }
}

/// Deterministic selector used by tests: takes the first `count` in the
/// order given.
pub struct DeterministicSelector;

impl WitnessSelector for DeterministicSelector {
    fn choose(&self, eligible: &[Witness], count: usize) -> Vec<String> {
        eligible.iter().take(count).map(|w| w.uri.clone()).collect()
    }
}
