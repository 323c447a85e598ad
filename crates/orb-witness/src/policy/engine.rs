//! The witness policy engine (§4.6): `Evaluate(proofs)` and
//! `Select(candidates, excluded…)` over the recognized option set
//! (`MinNumberBatch`, `MinPercentBatch`, `MinNumberSystem`,
//! `MinPercentSystem`, `LogRequired`, `Operator`).
//!
//! Percent-of-total (§4.6 "the percent-of-total minimum") is always taken
//! against the witness's own class within the anchor's full candidate
//! pool — the same list `Select` draws from and `Evaluate` later reads back
//! with proofs attached — rather than a separately-tracked candidate count,
//! since the spec names no other quantity the two operations share.

use super::selector::WitnessSelector;
use super::witness::{Witness, WitnessClass};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub min_number_batch: u32,
    pub min_percent_batch: u32,
    pub min_number_system: u32,
    pub min_percent_system: u32,
    pub log_required: bool,
    pub operator: Operator,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_number_batch: 0,
            min_percent_batch: 0,
            min_number_system: 0,
            min_percent_system: 0,
            log_required: false,
            operator: Operator::And,
        }
    }
}

pub struct PolicyEngine {
    config: PolicyConfig,
}

fn required_count(min_number: u32, min_percent: u32, eligible_total: usize) -> usize {
    let percent_count = (min_percent as usize * eligible_total + 99) / 100;
    (min_number as usize).max(percent_count).min(eligible_total)
}

/// "satisfied if either the absolute minimum or the percent-of-total
/// minimum holds" (§4.6).
fn class_satisfied(proof_count: usize, class_total: usize, min_number: u32, min_percent: u32) -> bool {
    proof_count >= min_number as usize
        || (class_total > 0 && proof_count * 100 >= min_percent as usize * class_total)
}

impl PolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Partitions `witnesses` into batch/system, counts those selected with
    /// a verified, log-eligible proof, and applies the min rules per class
    /// combined with `Operator` (§4.6 `Evaluate`). Monotonic in the proof
    /// set: adding a proof can only raise a class's count, never lower it,
    /// so `Evaluate` never flips `true` back to `false` (§8 invariant 6).
    pub fn evaluate(&self, witnesses: &[Witness]) -> bool {
        let batch_selected = witnesses
            .iter()
            .filter(|w| w.class == WitnessClass::Batch && w.selected)
            .count();
        let system_selected = witnesses
            .iter()
            .filter(|w| w.class == WitnessClass::System && w.selected)
            .count();
        let batch_proofs = witnesses
            .iter()
            .filter(|w| w.class == WitnessClass::Batch && w.counts_toward(self.config.log_required))
            .count();
        let system_proofs = witnesses
            .iter()
            .filter(|w| w.class == WitnessClass::System && w.counts_toward(self.config.log_required))
            .count();

        let batch_ok = class_satisfied(
            batch_proofs,
            batch_selected,
            self.config.min_number_batch,
            self.config.min_percent_batch,
        );
        let system_ok = class_satisfied(
            system_proofs,
            system_selected,
            self.config.min_number_system,
            self.config.min_percent_system,
        );

        match self.config.operator {
            Operator::And => batch_ok && system_ok,
            Operator::Or => batch_ok || system_ok,
        }
    }

    /// Partitions `candidates`, filters out `excluded` and (if
    /// `LogRequired`) witnesses with no log, then chooses the minimum
    /// number of each class via `selector`. Under `AND` the two class
    /// selections are unioned; under `OR`, whichever class produced the
    /// smaller-or-equal-size non-empty set is used (§4.6 `Select`).
    pub fn select(
        &self,
        candidates: &[Witness],
        excluded: &[String],
        selector: &dyn WitnessSelector,
    ) -> Vec<String> {
        let eligible: Vec<Witness> = candidates
            .iter()
            .filter(|w| !excluded.iter().any(|e| e == &w.uri))
            .filter(|w| !self.config.log_required || w.has_log)
            .cloned()
            .collect();

        let batch_eligible: Vec<Witness> = eligible
            .iter()
            .filter(|w| w.class == WitnessClass::Batch)
            .cloned()
            .collect();
        let system_eligible: Vec<Witness> = eligible
            .iter()
            .filter(|w| w.class == WitnessClass::System)
            .cloned()
            .collect();

        let batch_needed = required_count(
            self.config.min_number_batch,
            self.config.min_percent_batch,
            batch_eligible.len(),
        );
        let system_needed = required_count(
            self.config.min_number_system,
            self.config.min_percent_system,
            system_eligible.len(),
        );

        let batch_chosen = selector.choose(&batch_eligible, batch_needed);
        let system_chosen = selector.choose(&system_eligible, system_needed);

        match self.config.operator {
            Operator::And => {
                let mut out = batch_chosen;
                out.extend(system_chosen);
                out
            }
            Operator::Or => match (batch_chosen.is_empty(), system_chosen.is_empty()) {
                (true, true) => Vec::new(),
                (true, false) => system_chosen,
                (false, true) => batch_chosen,
                (false, false) => {
                    if batch_chosen.len() <= system_chosen.len() {
                        batch_chosen
                    } else {
                        system_chosen
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::selector::DeterministicSelector;

    fn witnesses() -> Vec<Witness> {
        vec![
            Witness::candidate("https://b1.example", WitnessClass::Batch, true),
            Witness::candidate("https://b2.example", WitnessClass::Batch, true),
            Witness::candidate("https://s1.example", WitnessClass::System, true),
            Witness::candidate("https://s2.example", WitnessClass::System, true),
            Witness::candidate("https://s3.example", WitnessClass::System, false),
        ]
    }

    #[test]
    fn select_and_satisfies_both_classes() {
        let engine = PolicyEngine::new(PolicyConfig {
            min_number_batch: 1,
            min_number_system: 2,
            log_required: true,
            operator: Operator::And,
            ..Default::default()
        });
        let selected = engine.select(&witnesses(), &[], &DeterministicSelector);
        assert_eq!(selected.len(), 3);
        assert!(selected.contains(&"https://b1.example".to_string()));
        assert!(selected.contains(&"https://s1.example".to_string()));
        assert!(selected.contains(&"https://s2.example".to_string()));
        assert!(!selected.contains(&"https://s3.example".to_string()));
    }

    #[test]
    fn evaluate_and_requires_both_classes_proven() {
        let engine = PolicyEngine::new(PolicyConfig {
            min_number_batch: 1,
            min_number_system: 2,
            log_required: true,
            operator: Operator::And,
            ..Default::default()
        });
        let mut ws = witnesses();
        for w in ws.iter_mut().filter(|w| w.uri != "https://s3.example") {
            w.selected = true;
        }
        assert!(!engine.evaluate(&ws));

        ws[0].proof = Some(proof("https://b1.example"));
        assert!(!engine.evaluate(&ws));

        ws[2].proof = Some(proof("https://s1.example"));
        ws[3].proof = Some(proof("https://s2.example"));
        assert!(engine.evaluate(&ws));
    }

    #[test]
    fn evaluate_or_picks_cheapest_satisfied_side() {
        let engine = PolicyEngine::new(PolicyConfig {
            min_number_batch: 1,
            min_number_system: 1,
            operator: Operator::Or,
            ..Default::default()
        });
        let selected = engine.select(&witnesses(), &[], &DeterministicSelector);
        assert_eq!(selected.len(), 1);

        let mut ws = witnesses();
        let chosen = &selected[0];
        for w in ws.iter_mut() {
            w.selected = w.uri == *chosen;
        }
        ws.iter_mut().find(|w| w.uri == *chosen).unwrap().proof = Some(proof(chosen));
        assert!(engine.evaluate(&ws));
    }

    #[test]
    fn select_never_returns_excluded_witness() {
        let engine = PolicyEngine::new(PolicyConfig {
            min_number_batch: 2,
            operator: Operator::Or,
            ..Default::default()
        });
        let selected = engine.select(
            &witnesses(),
            &["https://b1.example".to_string()],
            &DeterministicSelector,
        );
        assert!(!selected.contains(&"https://b1.example".to_string()));
    }

    #[test]
    fn evaluate_is_monotonic_in_proof_set() {
        let engine = PolicyEngine::new(PolicyConfig {
            min_percent_system: 67,
            operator: Operator::Or,
            ..Default::default()
        });
        let mut ws = witnesses();
        for w in ws.iter_mut().filter(|w| w.class == WitnessClass::System && w.has_log) {
            w.selected = true;
        }
        let before = engine.evaluate(&ws);
        ws.iter_mut()
            .find(|w| w.uri == "https://s1.example")
            .unwrap()
            .proof = Some(proof("https://s1.example"));
        let after = engine.evaluate(&ws);
        assert!(!(before && !after), "evaluate flipped true to false after adding a proof");
    }

    fn proof(uri: &str) -> super::super::witness::WitnessProof {
        super::super::witness::WitnessProof {
            witness_uri: uri.to_string(),
            signature: vec![1, 2, 3],
            completed_at: chrono::Utc::now(),
        }
    }
}
