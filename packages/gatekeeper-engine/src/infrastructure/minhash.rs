//! MinHash signature generation and Jaccard estimation.
//!
//! Reduces a set of 64-bit tokens to a signature of H 32-bit cells whose
//! cell-wise equality rate estimates Jaccard similarity. Hash functions are
//! of the form `h_i(x) = |(a_i·x + b_i) mod p|` with `p = 2^31 − 1`;
//! coefficients are drawn from a seeded 64-bit linear congruential generator
//! (Knuth MMIX constants) so the same `(H, seed)` yields identical
//! signatures on every platform. Changing the generator or the prime breaks
//! every persisted signature.

use std::collections::HashSet;

use crate::constants::{DEFAULT_NUM_HASH_FUNCTIONS, DEFAULT_SEED};
use crate::error::{GatekeeperError, Result};
use crate::infrastructure::shingling;

/// Mersenne prime 2^31 − 1 used as the hash modulus.
const LARGE_PRIME: i64 = 2_147_483_647;

/// Sentinel cell value ("infinity"); equals the prime, so real hash values
/// are always strictly smaller.
const SENTINEL: u32 = 0x7fff_ffff;

/// Deterministic 64-bit LCG for coefficient derivation.
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }
}

/// MinHash signature generator with fixed coefficient arrays.
#[derive(Debug, Clone)]
pub struct MinHashGenerator {
    num_hash_functions: usize,
    coeff_a: Vec<i64>,
    coeff_b: Vec<i64>,
}

impl MinHashGenerator {
    /// Creates a generator with `num_hash_functions` rows seeded
    /// deterministically. Coefficients satisfy `a ∈ [1, p−1]`, `b ∈ [0, p−1]`.
    pub fn new(num_hash_functions: usize, seed: u64) -> Self {
        let mut rng = Lcg::new(seed);
        let mut coeff_a = Vec::with_capacity(num_hash_functions);
        let mut coeff_b = Vec::with_capacity(num_hash_functions);

        for _ in 0..num_hash_functions {
            coeff_a.push((rng.next_u64() % (LARGE_PRIME as u64 - 1)) as i64 + 1);
            coeff_b.push((rng.next_u64() % LARGE_PRIME as u64) as i64);
        }

        Self {
            num_hash_functions,
            coeff_a,
            coeff_b,
        }
    }

    pub fn num_hash_functions(&self) -> usize {
        self.num_hash_functions
    }

    /// Computes the MinHash signature for a set of hashed shingles.
    ///
    /// An empty set yields a signature of all sentinel cells.
    pub fn compute_signature(&self, shingles: &HashSet<u64>) -> Vec<u32> {
        let mut signature = vec![SENTINEL; self.num_hash_functions];

        for &shingle in shingles {
            let x = shingle as i64;
            for i in 0..self.num_hash_functions {
                let hash = self.coeff_a[i]
                    .wrapping_mul(x)
                    .wrapping_add(self.coeff_b[i])
                    % LARGE_PRIME;
                let hash = hash.unsigned_abs() as u32;
                if hash < signature[i] {
                    signature[i] = hash;
                }
            }
        }

        signature
    }

    /// Computes the MinHash signature from string shingles.
    pub fn compute_signature_from_strings(&self, shingles: &HashSet<String>) -> Vec<u32> {
        self.compute_signature(&shingling::hash_shingles(shingles))
    }

    /// Estimates Jaccard similarity between two signatures.
    pub fn estimate_similarity(&self, first: &[u32], second: &[u32]) -> Result<f64> {
        estimate_similarity(first, second)
    }
}

impl Default for MinHashGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_HASH_FUNCTIONS, DEFAULT_SEED)
    }
}

/// Estimates Jaccard similarity as the fraction of equal cells.
pub fn estimate_similarity(first: &[u32], second: &[u32]) -> Result<f64> {
    if first.len() != second.len() {
        return Err(GatekeeperError::length_mismatch(format!(
            "signature length mismatch: {} vs {}",
            first.len(),
            second.len()
        )));
    }
    if first.is_empty() {
        return Err(GatekeeperError::invalid_input("empty signature"));
    }

    let matches = first
        .iter()
        .zip(second.iter())
        .filter(|(a, b)| a == b)
        .count();

    Ok(matches as f64 / first.len() as f64)
}

/// Serializes a signature as big-endian 32-bit cells in index order.
pub fn signature_to_bytes(signature: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(signature.len() * 4);
    for cell in signature {
        bytes.extend_from_slice(&cell.to_be_bytes());
    }
    bytes
}

/// Deserializes a signature from its big-endian byte form.
pub fn bytes_to_signature(bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.len() % 4 != 0 {
        return Err(GatekeeperError::corrupt_signature(format!(
            "corrupt signature: byte length {} is not a multiple of 4",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
