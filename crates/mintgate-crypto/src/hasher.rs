//! # Digest Computation
//!
//! Thin dispatch over the two supported one-way functions. Both produce
//! 32 bytes, so callers never see algorithm-specific widths.

use mintgate_core::{Hash32, HashAlgorithm};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// Hash raw bytes with the given algorithm.
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Hash32 {
    let out: [u8; 32] = match algorithm {
        HashAlgorithm::Keccak256 => Keccak256::digest(data).into(),
        HashAlgorithm::Sha256 => Sha256::digest(data).into(),
    };
    Hash32::from_bytes(out)
}

/// Hash the concatenation `left || right`, in the order given.
pub fn digest_concat(algorithm: HashAlgorithm, left: &Hash32, right: &Hash32) -> Hash32 {
    let mut input = [0u8; 64];
    input[..32].copy_from_slice(left.as_bytes());
    input[32..].copy_from_slice(right.as_bytes());
    digest(algorithm, &input)
}
