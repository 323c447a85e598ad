//! Merkle leaf hashing and inclusion-proof verification for a witness's
//! transparency log (§4.8 steps 2 and 4). Domain-separated `blake3`
//! hashing, grounded on the teacher's `ziplock-json` Merkle tree
//! (`bpi-core/crates/ziplock-json/src/merkle.rs` `MerkleNode::leaf/branch`
//! and `MerkleProof::verify`), generalized from raw byte leaves to the
//! `(createdAt_ms, canonical-vc-bytes)` leaf the witness log commits to.

use serde::{Deserialize, Serialize};

const LEAF_PREFIX: &[u8] = b"orb-vct:leaf:";
const BRANCH_PREFIX: &[u8] = b"orb-vct:branch:";

/// The Merkle leaf hash over `(createdAt_ms, canonical-vc-bytes)` (§4.8
/// step 2).
pub fn leaf_hash(created_at_ms: i64, canonical_vc_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(LEAF_PREFIX);
    hasher.update(&created_at_ms.to_be_bytes());
    hasher.update(canonical_vc_bytes);
    *hasher.finalize().as_bytes()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InclusionProofStep {
    pub sibling_hash: [u8; 32],
    pub is_right: bool,
}

/// `ProofByHash` response body (§4.8 step 4): the audit path from a leaf to
/// the tree root, plus the leaf's position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InclusionProof {
    pub leaf_index: u64,
    pub audit_path: Vec<InclusionProofStep>,
}

impl InclusionProof {
    /// The literal edge case named in §4.8 step 4: a non-root leaf
    /// (`leaf_index > 0`) with an empty audit path can never be valid,
    /// since only the tree's sole leaf has no siblings to prove against.
    pub fn is_trivially_invalid(&self) -> bool {
        self.leaf_index > 0 && self.audit_path.is_empty()
    }

    /// Full cryptographic verification: replays the audit path over
    /// `leaf_hash` and checks the reconstructed root against `root_hash`.
    /// Stronger than the literal rule above, which only catches the one
    /// shape the spec names; this is the path actually trusted to confirm
    /// a credential's presence.
    pub fn verify(&self, leaf: [u8; 32], root_hash: [u8; 32]) -> bool {
        if self.is_trivially_invalid() {
            return false;
        }
        let mut current = leaf;
        for step in &self.audit_path {
            let mut hasher = blake3::Hasher::new();
            hasher.update(BRANCH_PREFIX);
            if step.is_right {
                hasher.update(&current);
                hasher.update(&step.sibling_hash);
            } else {
                hasher.update(&step.sibling_hash);
                hasher.update(&current);
            }
            current = *hasher.finalize().as_bytes();
        }
        current == root_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(left: [u8; 32], right: [u8; 32]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(BRANCH_PREFIX);
        hasher.update(&left);
        hasher.update(&right);
        *hasher.finalize().as_bytes()
    }

    #[test]
    fn single_leaf_tree_has_no_audit_path_and_verifies() {
        let leaf = leaf_hash(1000, b"vc-bytes");
        let proof = InclusionProof {
            leaf_index: 0,
            audit_path: vec![],
        };
        assert!(proof.verify(leaf, leaf));
    }

    #[test]
    fn non_root_leaf_with_empty_path_is_trivially_invalid() {
        let leaf = leaf_hash(1000, b"vc-bytes");
        let proof = InclusionProof {
            leaf_index: 1,
            audit_path: vec![],
        };
        assert!(proof.is_trivially_invalid());
        assert!(!proof.verify(leaf, leaf));
    }

    #[test]
    fn two_leaf_tree_verifies_against_reconstructed_root() {
        let leaf_a = leaf_hash(1000, b"vc-a");
        let leaf_b = leaf_hash(2000, b"vc-b");
        let root = branch(leaf_a, leaf_b);

        let proof_a = InclusionProof {
            leaf_index: 0,
            audit_path: vec![InclusionProofStep {
                sibling_hash: leaf_b,
                is_right: true,
            }],
        };
        assert!(proof_a.verify(leaf_a, root));

        let proof_b = InclusionProof {
            leaf_index: 1,
            audit_path: vec![InclusionProofStep {
                sibling_hash: leaf_a,
                is_right: false,
            }],
        };
        assert!(proof_b.verify(leaf_b, root));
    }

    #[test]
    fn tampered_sibling_hash_fails_verification() {
        let leaf_a = leaf_hash(1000, b"vc-a");
        let leaf_b = leaf_hash(2000, b"vc-b");
        let proof_a = InclusionProof {
            leaf_index: 0,
            audit_path: vec![InclusionProofStep {
                sibling_hash: leaf_hash(9999, b"wrong"),
                is_right: true,
            }],
        };
        let root = branch(leaf_a, leaf_b);
        assert!(!proof_a.verify(leaf_a, root));
    }
}
