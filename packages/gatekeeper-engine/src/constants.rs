//! Shared constants for the similarity engine.

/// Default Jaccard similarity threshold; matches at or above it are reported.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.95;

/// Minimum accepted similarity threshold.
pub const MIN_SIMILARITY_THRESHOLD: f64 = 0.5;

/// Maximum accepted similarity threshold.
pub const MAX_SIMILARITY_THRESHOLD: f64 = 1.0;

/// Matches at or above this similarity mark a result as high confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.95;

/// Default number of MinHash hash functions (signature width).
pub const DEFAULT_NUM_HASH_FUNCTIONS: usize = 128;

/// Default number of LSH bands.
pub const DEFAULT_NUM_BANDS: usize = 16;

/// Word n-gram size used by the shingler.
pub const NGRAM_SIZE: usize = 3;

/// Default seed for MinHash coefficient generation.
pub const DEFAULT_SEED: u64 = 42;
