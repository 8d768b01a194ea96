//! Algorithmic infrastructure: pruning, shingling, MinHash, LSH.

pub mod lsh;
pub mod minhash;
pub mod pruning;
pub mod shingling;

pub use lsh::{LshIndex, SimilarityResult};
pub use minhash::MinHashGenerator;
