//! # Allowlist Merkle Trees
//!
//! Membership proofs for the allowlist mint path.
//!
//! ## Algorithm
//!
//! - Leaf: `H(address_bytes)`, the 20 raw bytes of the principal. No
//!   salt and no domain prefix, so the same address always yields the
//!   same leaf.
//! - Node: `H(min(a, b) || max(a, b))`. Ordering each pair before hashing
//!   removes the need for left/right flags in the proof.
//!
//! A proof is the list of siblings from leaf to root. Verification folds
//! the leaf through the siblings and compares against the root. A tree of
//! one leaf has that leaf as its root and an empty proof.
//!
//! ## Tree Construction
//!
//! [`AllowlistTree`] sorts and de-duplicates leaves before building, so
//! the root depends only on the set of addresses, not on the order or
//! multiplicity in which they were listed. An odd node at the end of a
//! level is carried up unchanged.
//!
//! ## Replay
//!
//! Verification consumes nothing. A valid proof stays valid for as long
//! as its root is the active one.

use serde::{Deserialize, Serialize};

use mintgate_core::{FormatError, Hash32, HashAlgorithm, Leaf, Principal, Root};

use crate::hasher::{digest, digest_concat};

// ---------------------------------------------------------------------------
// Core hashing
// ---------------------------------------------------------------------------

/// Derive the allowlist leaf for a principal: `H(address_bytes)`.
pub fn hash_leaf(algorithm: HashAlgorithm, principal: &Principal) -> Leaf {
    digest(algorithm, principal.as_bytes())
}

/// Combine two nodes with the sorted-pair rule.
pub fn hash_pair(algorithm: HashAlgorithm, a: &Hash32, b: &Hash32) -> Hash32 {
    if a <= b {
        digest_concat(algorithm, a, b)
    } else {
        digest_concat(algorithm, b, a)
    }
}

// ---------------------------------------------------------------------------
// Proof
// ---------------------------------------------------------------------------

/// Ordered sibling hashes from a leaf up to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proof(Vec<Hash32>);

impl Proof {
    /// Wrap a sibling list.
    pub fn new(siblings: Vec<Hash32>) -> Self {
        Self(siblings)
    }

    /// The empty proof (valid only for a single-leaf tree).
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Parse hex-encoded siblings. Any element that is not exactly 32
    /// bytes of hex rejects the whole proof.
    pub fn from_hex<S: AsRef<str>>(siblings: &[S]) -> Result<Self, FormatError> {
        siblings
            .iter()
            .map(|s| Hash32::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// The sibling hashes, leaf end first.
    pub fn siblings(&self) -> &[Hash32] {
        &self.0
    }

    /// Number of siblings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the proof has no siblings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex renderings of the siblings, `0x`-prefixed.
    pub fn to_hex(&self) -> Vec<String> {
        self.0.iter().map(|h| h.to_string()).collect()
    }

    /// Fold `leaf` through the siblings and return the reconstructed root.
    pub fn compute_root(&self, algorithm: HashAlgorithm, leaf: &Leaf) -> Root {
        self.0
            .iter()
            .fold(*leaf, |acc, sibling| hash_pair(algorithm, &acc, sibling))
    }
}

impl From<Vec<Hash32>> for Proof {
    fn from(siblings: Vec<Hash32>) -> Self {
        Self(siblings)
    }
}

// ---------------------------------------------------------------------------
// MerkleVerifier
// ---------------------------------------------------------------------------

/// Leaf derivation and proof verification under a fixed hash algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MerkleVerifier {
    algorithm: HashAlgorithm,
}

impl MerkleVerifier {
    /// Create a verifier for the given algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The hash algorithm in use.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Derive the leaf for a principal.
    pub fn hash_leaf(&self, principal: &Principal) -> Leaf {
        hash_leaf(self.algorithm, principal)
    }

    /// Returns `true` iff `proof` folds `leaf` to `root`.
    pub fn verify(&self, leaf: &Leaf, proof: &Proof, root: &Root) -> bool {
        let ok = proof.compute_root(self.algorithm, leaf) == *root;
        tracing::trace!(leaf = %leaf, siblings = proof.len(), ok, "merkle proof checked");
        ok
    }
}

// ---------------------------------------------------------------------------
// AllowlistTree: off-line root and proof construction
// ---------------------------------------------------------------------------

/// A complete allowlist tree, kept level by level so proofs can be read
/// off directly.
#[derive(Debug, Clone)]
pub struct AllowlistTree {
    algorithm: HashAlgorithm,
    /// `layers[0]` holds the sorted, distinct leaves; the last layer holds
    /// only the root.
    layers: Vec<Vec<Hash32>>,
}

impl AllowlistTree {
    /// Build a tree over the leaves of the given principals.
    pub fn from_principals(
        algorithm: HashAlgorithm,
        principals: &[Principal],
    ) -> Result<Self, FormatError> {
        let leaves = principals.iter().map(|p| hash_leaf(algorithm, p)).collect();
        Self::from_leaves(algorithm, leaves)
    }

    /// Build a tree over precomputed leaves.
    pub fn from_leaves(algorithm: HashAlgorithm, mut leaves: Vec<Leaf>) -> Result<Self, FormatError> {
        if leaves.is_empty() {
            return Err(FormatError::Empty("allowlist"));
        }
        leaves.sort_unstable();
        leaves.dedup();

        let mut layers = vec![leaves];
        while let Some(level) = layers.last() {
            if level.len() <= 1 {
                break;
            }
            let next: Vec<Hash32> = level
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => hash_pair(algorithm, a, b),
                    _ => pair[0],
                })
                .collect();
            layers.push(next);
        }

        Ok(Self { algorithm, layers })
    }

    /// The hash algorithm the tree was built with.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The committed root.
    pub fn root(&self) -> Root {
        // Construction guarantees a non-empty top layer.
        self.layers
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or(Hash32::ZERO)
    }

    /// Distinct leaves, sorted.
    pub fn leaves(&self) -> &[Leaf] {
        &self.layers[0]
    }

    /// Number of distinct leaves.
    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    /// Always `false`; an empty allowlist cannot be built.
    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    /// The inclusion proof for `leaf`, or `None` if it is not in the tree.
    pub fn proof(&self, leaf: &Leaf) -> Option<Proof> {
        let mut index = self.layers[0].binary_search(leaf).ok()?;
        let mut siblings = Vec::with_capacity(self.layers.len().saturating_sub(1));
        for level in &self.layers[..self.layers.len() - 1] {
            if let Some(sibling) = level.get(index ^ 1) {
                siblings.push(*sibling);
            }
            index /= 2;
        }
        Some(Proof(siblings))
    }

    /// The inclusion proof for a principal's leaf.
    pub fn proof_for(&self, principal: &Principal) -> Option<Proof> {
        self.proof(&hash_leaf(self.algorithm, principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Principal {
        Principal::from_bytes([n; 20])
    }

    fn addrs(range: std::ops::RangeInclusive<u8>) -> Vec<Principal> {
        range.map(addr).collect()
    }

    // -----------------------------------------------------------------------
    // Hashing
    // -----------------------------------------------------------------------

    #[test]
    fn test_leaf_is_hash_of_raw_address_bytes() {
        let p = addr(0x11);
        assert_eq!(
            hash_leaf(HashAlgorithm::Keccak256, &p),
            digest(HashAlgorithm::Keccak256, &[0x11; 20])
        );
        assert_eq!(
            hash_leaf(HashAlgorithm::Keccak256, &p),
            hash_leaf(HashAlgorithm::Keccak256, &p)
        );
        assert_ne!(
            hash_leaf(HashAlgorithm::Keccak256, &p),
            hash_leaf(HashAlgorithm::Sha256, &p)
        );
    }

    #[test]
    fn test_hash_pair_is_symmetric() {
        let a = Hash32::from_bytes([3u8; 32]);
        let b = Hash32::from_bytes([9u8; 32]);
        assert_eq!(
            hash_pair(HashAlgorithm::Keccak256, &a, &b),
            hash_pair(HashAlgorithm::Keccak256, &b, &a)
        );
        assert_eq!(
            hash_pair(HashAlgorithm::Keccak256, &b, &a),
            digest_concat(HashAlgorithm::Keccak256, &a, &b)
        );
    }

    // -----------------------------------------------------------------------
    // Tree construction
    // -----------------------------------------------------------------------

    #[test]
    fn test_single_leaf_root_is_leaf() {
        let tree = AllowlistTree::from_principals(HashAlgorithm::Keccak256, &[addr(1)]).unwrap();
        let leaf = hash_leaf(HashAlgorithm::Keccak256, &addr(1));
        assert_eq!(tree.root(), leaf);
        let proof = tree.proof(&leaf).unwrap();
        assert!(proof.is_empty());
        assert!(MerkleVerifier::new(HashAlgorithm::Keccak256).verify(&leaf, &proof, &tree.root()));
    }

    #[test]
    fn test_two_leaf_root() {
        let alg = HashAlgorithm::Keccak256;
        let tree = AllowlistTree::from_principals(alg, &[addr(1), addr(2)]).unwrap();
        let l1 = hash_leaf(alg, &addr(1));
        let l2 = hash_leaf(alg, &addr(2));
        assert_eq!(tree.root(), hash_pair(alg, &l1, &l2));
        assert_eq!(tree.proof(&l1).unwrap().siblings(), &[l2]);
        assert_eq!(tree.proof(&l2).unwrap().siblings(), &[l1]);
    }

    #[test]
    fn test_odd_node_is_promoted() {
        let alg = HashAlgorithm::Sha256;
        let tree = AllowlistTree::from_principals(alg, &addrs(1..=3)).unwrap();
        let leaves = tree.leaves().to_vec();
        let expected = hash_pair(alg, &hash_pair(alg, &leaves[0], &leaves[1]), &leaves[2]);
        assert_eq!(tree.root(), expected);
        // The promoted leaf has a single sibling: the pair above its neighbours.
        assert_eq!(tree.proof(&leaves[2]).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicates_collapse() {
        let alg = HashAlgorithm::Keccak256;
        let with_dupes =
            AllowlistTree::from_principals(alg, &[addr(1), addr(2), addr(1), addr(2)]).unwrap();
        let distinct = AllowlistTree::from_principals(alg, &[addr(2), addr(1)]).unwrap();
        assert_eq!(with_dupes.len(), 2);
        assert_eq!(with_dupes.root(), distinct.root());
    }

    #[test]
    fn test_empty_allowlist_rejected() {
        let err = AllowlistTree::from_principals(HashAlgorithm::Keccak256, &[]).unwrap_err();
        assert_eq!(err, FormatError::Empty("allowlist"));
    }

    #[test]
    fn test_every_member_verifies_for_various_sizes() {
        let alg = HashAlgorithm::Keccak256;
        let verifier = MerkleVerifier::new(alg);
        for size in [1u8, 2, 3, 4, 5, 7, 8, 9, 16, 17, 33] {
            let members = addrs(1..=size);
            let tree = AllowlistTree::from_principals(alg, &members).unwrap();
            for p in &members {
                let proof = tree.proof_for(p).unwrap();
                assert!(
                    verifier.verify(&verifier.hash_leaf(p), &proof, &tree.root()),
                    "proof failed at size={size}, member={p}"
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // Verification failures
    // -----------------------------------------------------------------------

    #[test]
    fn test_non_member_has_no_proof_and_cannot_borrow_one() {
        let alg = HashAlgorithm::Keccak256;
        let verifier = MerkleVerifier::new(alg);
        let tree = AllowlistTree::from_principals(alg, &addrs(1..=4)).unwrap();
        let outsider = addr(99);
        assert!(tree.proof_for(&outsider).is_none());
        let borrowed = tree.proof_for(&addr(1)).unwrap();
        assert!(!verifier.verify(&verifier.hash_leaf(&outsider), &borrowed, &tree.root()));
    }

    #[test]
    fn test_tampered_sibling_fails() {
        let alg = HashAlgorithm::Keccak256;
        let verifier = MerkleVerifier::new(alg);
        let tree = AllowlistTree::from_principals(alg, &addrs(1..=9)).unwrap();
        let leaf = verifier.hash_leaf(&addr(4));
        let mut siblings = tree.proof(&leaf).unwrap().siblings().to_vec();
        siblings[0] = Hash32::ZERO;
        assert!(!verifier.verify(&leaf, &Proof::new(siblings), &tree.root()));
    }

    #[test]
    fn test_wrong_algorithm_fails() {
        let tree = AllowlistTree::from_principals(HashAlgorithm::Keccak256, &addrs(1..=4)).unwrap();
        let proof = tree.proof_for(&addr(2)).unwrap();
        let sha = MerkleVerifier::new(HashAlgorithm::Sha256);
        assert!(!sha.verify(&sha.hash_leaf(&addr(2)), &proof, &tree.root()));
    }

    #[test]
    fn test_proof_from_hex() {
        let good = Proof::from_hex(&["0x".to_string() + &"ab".repeat(32)]).unwrap();
        assert_eq!(good.len(), 1);
        assert_eq!(good.to_hex()[0], format!("0x{}", "ab".repeat(32)));
        let long = "ab".repeat(32);
        let bad = Proof::from_hex(&[long.as_str(), "0xdeadbeef"]).unwrap_err();
        assert!(matches!(bad, FormatError::InvalidLength { expected: 32, .. }));
        assert!(Proof::from_hex::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_proof_serializes_as_hex_array() {
        let tree = AllowlistTree::from_principals(HashAlgorithm::Keccak256, &addrs(1..=2)).unwrap();
        let proof = tree.proof_for(&addr(1)).unwrap();
        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json.as_array().map(|a| a.len()), Some(1));
        let back: Proof = serde_json::from_value(json).unwrap();
        assert_eq!(back, proof);
    }
}
