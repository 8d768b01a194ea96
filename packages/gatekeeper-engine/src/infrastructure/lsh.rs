//! Banded LSH index for approximate nearest-neighbor lookup.
//!
//! Signatures are split into B bands of R = ⌊H/B⌋ cells; each band maps a
//! stable string key of its cells to the set of API ids sharing it. Two
//! signatures with true Jaccard similarity J collide in at least one band
//! with probability `1 − (1 − J^R)^B`; the defaults (H=128, B=16, R=8) make
//! collisions near-certain at J=0.95 and negligible at J=0.5.
//!
//! All internal maps sit behind one shared-exclusive lock: readers never
//! observe a signature present in one band but absent from another, and an
//! insert is visible to every subsequent query once it returns.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::constants::{DEFAULT_NUM_BANDS, DEFAULT_NUM_HASH_FUNCTIONS};
use crate::error::{GatekeeperError, Result};
use crate::infrastructure::minhash;

/// A candidate API together with its estimated Jaccard similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    pub api_uuid: String,
    pub similarity: f64,
}

#[derive(Default)]
struct IndexState {
    /// Per-band mapping from band key to the API ids hashing to it.
    band_tables: Vec<HashMap<String, HashSet<String>>>,
    /// Full signatures for similarity verification.
    signatures: HashMap<String, Vec<u32>>,
    /// Owning tenant per API id.
    tenants: HashMap<String, String>,
}

impl IndexState {
    fn detach_bands(&mut self, api_uuid: &str, signature: &[u32], rows_per_band: usize) {
        for (band, table) in self.band_tables.iter_mut().enumerate() {
            let key = band_key(signature, band, rows_per_band);
            if let Some(members) = table.get_mut(&key) {
                members.remove(api_uuid);
                if members.is_empty() {
                    table.remove(&key);
                }
            }
        }
    }

    fn attach_bands(&mut self, api_uuid: &str, signature: &[u32], rows_per_band: usize) {
        for (band, table) in self.band_tables.iter_mut().enumerate() {
            let key = band_key(signature, band, rows_per_band);
            table.entry(key).or_default().insert(api_uuid.to_string());
        }
    }
}

/// Computes the stable string key for one band: decimal cells joined by `_`.
fn band_key(signature: &[u32], band: usize, rows_per_band: usize) -> String {
    let start = band * rows_per_band;
    let end = (start + rows_per_band).min(signature.len());

    let mut key = String::new();
    for cell in &signature[start.min(signature.len())..end] {
        key.push_str(&cell.to_string());
        key.push('_');
    }
    key
}

/// Multi-tenant LSH index over MinHash signatures.
pub struct LshIndex {
    num_bands: usize,
    rows_per_band: usize,
    signature_length: usize,
    state: RwLock<IndexState>,
}

impl LshIndex {
    /// Creates an index for signatures of `signature_length` cells split
    /// into `num_bands` bands.
    ///
    /// When the length is not evenly divisible the trailing
    /// `signature_length mod num_bands` cells are ignored uniformly for
    /// every signature.
    pub fn new(num_bands: usize, signature_length: usize) -> Self {
        let rows_per_band = signature_length / num_bands;

        if signature_length % num_bands != 0 {
            warn!(
                signature_length,
                num_bands, "signature length is not evenly divisible by band count; trailing cells will be ignored"
            );
        }

        Self {
            num_bands,
            rows_per_band,
            signature_length,
            state: RwLock::new(IndexState {
                band_tables: vec![HashMap::new(); num_bands],
                signatures: HashMap::new(),
                tenants: HashMap::new(),
            }),
        }
    }

    /// Creates an index with the default banding (16 bands over 128 cells).
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_NUM_BANDS, DEFAULT_NUM_HASH_FUNCTIONS)
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    pub fn rows_per_band(&self) -> usize {
        self.rows_per_band
    }

    /// Inserts or replaces the signature for an API.
    ///
    /// A second insert with the same id is an update: the previous band
    /// memberships are detached before the new ones attach, all under one
    /// exclusive lock, so readers see either the old entry or the new one
    /// but never a mixture.
    pub fn insert(&self, organization: &str, api_uuid: &str, signature: Vec<u32>) -> Result<()> {
        if signature.len() != self.signature_length {
            return Err(GatekeeperError::length_mismatch(format!(
                "signature length mismatch: expected {}, got {}",
                self.signature_length,
                signature.len()
            )));
        }

        let mut state = self.state.write().unwrap();

        if let Some(previous) = state.signatures.remove(api_uuid) {
            let rows = self.rows_per_band;
            state.detach_bands(api_uuid, &previous, rows);
        }

        state.attach_bands(api_uuid, &signature, self.rows_per_band);
        state.signatures.insert(api_uuid.to_string(), signature);
        state
            .tenants
            .insert(api_uuid.to_string(), organization.to_string());

        debug!(api_uuid, organization, "added signature to LSH index");
        Ok(())
    }

    /// Removes an API from the index. Unknown ids are a no-op.
    pub fn remove(&self, api_uuid: &str) {
        let mut state = self.state.write().unwrap();
        state.tenants.remove(api_uuid);

        if let Some(signature) = state.signatures.remove(api_uuid) {
            let rows = self.rows_per_band;
            state.detach_bands(api_uuid, &signature, rows);
            debug!(api_uuid, "removed signature from LSH index");
        }
    }

    /// Returns the ids sharing at least one band bucket with the query,
    /// restricted to the given tenant.
    pub fn find_candidates(&self, organization: &str, signature: &[u32]) -> HashSet<String> {
        let state = self.state.read().unwrap();
        let mut candidates = HashSet::new();

        for (band, table) in state.band_tables.iter().enumerate() {
            let key = band_key(signature, band, self.rows_per_band);
            if let Some(members) = table.get(&key) {
                for api_uuid in members {
                    if state.tenants.get(api_uuid).map(String::as_str) == Some(organization) {
                        candidates.insert(api_uuid.clone());
                    }
                }
            }
        }

        candidates
    }

    /// Returns candidates whose full-signature Jaccard estimate reaches the
    /// threshold, sorted by similarity descending with ties broken by id.
    pub fn find_similar(
        &self,
        organization: &str,
        signature: &[u32],
        threshold: f64,
    ) -> Result<Vec<SimilarityResult>> {
        let candidates = self.find_candidates(organization, signature);

        let state = self.state.read().unwrap();
        let mut results = Vec::new();

        for api_uuid in candidates {
            if let Some(candidate) = state.signatures.get(&api_uuid) {
                let similarity = minhash::estimate_similarity(signature, candidate)?;
                if similarity >= threshold {
                    results.push(SimilarityResult {
                        api_uuid,
                        similarity,
                    });
                }
            }
        }
        drop(state);

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.api_uuid.cmp(&b.api_uuid))
        });

        Ok(results)
    }

    /// Returns a copy of the stored signature for an API, if present.
    pub fn get_signature(&self, api_uuid: &str) -> Option<Vec<u32>> {
        self.state.read().unwrap().signatures.get(api_uuid).cloned()
    }

    pub fn contains(&self, api_uuid: &str) -> bool {
        self.state.read().unwrap().signatures.contains_key(api_uuid)
    }

    /// Number of indexed APIs.
    pub fn len(&self) -> usize {
        self.state.read().unwrap().signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every signature, tenant mapping and band bucket.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap();
        state.signatures.clear();
        state.tenants.clear();
        for table in &mut state.band_tables {
            table.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::infrastructure::minhash::MinHashGenerator;

    fn signature_for(tokens: &[u64]) -> Vec<u32> {
        MinHashGenerator::new(128, 42).compute_signature(&tokens.iter().copied().collect())
    }

    #[test]
    fn test_insert_and_find_candidates() {
        let index = LshIndex::with_defaults();
        let sig = signature_for(&[1, 2, 3]);

        index.insert("tenant-a", "api-1", sig.clone()).unwrap();

        let candidates = index.find_candidates("tenant-a", &sig);
        assert!(candidates.contains("api-1"));
    }

    #[test]
    fn test_tenant_isolation() {
        let index = LshIndex::with_defaults();
        let sig = signature_for(&[1, 2, 3]);

        index.insert("tenant-a", "api-1", sig.clone()).unwrap();

        assert!(index.find_candidates("tenant-b", &sig).is_empty());
        assert!(index
            .find_similar("tenant-b", &sig, 0.5)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let index = LshIndex::with_defaults();
        let err = index.insert("tenant-a", "api-1", vec![1, 2, 3]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::LengthMismatch);
        assert!(!index.contains("api-1"));
    }

    #[test]
    fn test_find_similar_identical() {
        let index = LshIndex::with_defaults();
        let sig = signature_for(&[1, 2, 3, 4, 5]);

        index.insert("tenant-a", "api-1", sig.clone()).unwrap();

        let results = index.find_similar("tenant-a", &sig, 0.95).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].api_uuid, "api-1");
        assert_eq!(results[0].similarity, 1.0);
    }

    #[test]
    fn test_find_similar_sorted_with_tiebreak() {
        let index = LshIndex::with_defaults();
        let sig = signature_for(&[1, 2, 3, 4, 5]);

        // Two identical entries tie at 1.0 and order by id ascending.
        index.insert("tenant-a", "api-b", sig.clone()).unwrap();
        index.insert("tenant-a", "api-a", sig.clone()).unwrap();

        let results = index.find_similar("tenant-a", &sig, 0.5).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].api_uuid, "api-a");
        assert_eq!(results[1].api_uuid, "api-b");
    }

    #[test]
    fn test_threshold_filters_dissimilar() {
        let index = LshIndex::with_defaults();
        let first = signature_for(&(0u64..50).collect::<Vec<_>>());
        let second = signature_for(&(1000u64..1050).collect::<Vec<_>>());

        index.insert("tenant-a", "api-1", first).unwrap();

        let results = index.find_similar("tenant-a", &second, 0.5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_update_replaces_band_memberships() {
        let index = LshIndex::with_defaults();
        let old = signature_for(&[1, 2, 3]);
        let new = signature_for(&[100, 200, 300]);

        index.insert("tenant-a", "api-1", old.clone()).unwrap();
        index.insert("tenant-a", "api-1", new.clone()).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get_signature("api-1"), Some(new.clone()));

        // The old signature's buckets no longer reference the id.
        assert!(index.find_candidates("tenant-a", &old).is_empty());
        assert!(index.find_candidates("tenant-a", &new).contains("api-1"));
    }

    #[test]
    fn test_remove_drops_buckets() {
        let index = LshIndex::with_defaults();
        let sig = signature_for(&[1, 2, 3]);

        index.insert("tenant-a", "api-1", sig.clone()).unwrap();
        index.remove("api-1");

        assert_eq!(index.len(), 0);
        assert!(!index.contains("api-1"));
        assert!(index.get_signature("api-1").is_none());
        assert!(index.find_candidates("tenant-a", &sig).is_empty());

        let state = index.state.read().unwrap();
        assert!(state.band_tables.iter().all(HashMap::is_empty));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let index = LshIndex::with_defaults();
        index.remove("missing");
        assert!(index.is_empty());
    }

    #[test]
    fn test_clear() {
        let index = LshIndex::with_defaults();
        index
            .insert("tenant-a", "api-1", signature_for(&[1, 2]))
            .unwrap();
        index
            .insert("tenant-b", "api-2", signature_for(&[3, 4]))
            .unwrap();

        index.clear();

        assert!(index.is_empty());
        let state = index.state.read().unwrap();
        assert!(state.tenants.is_empty());
        assert!(state.band_tables.iter().all(HashMap::is_empty));
    }

    #[test]
    fn test_uneven_banding_ignores_trailing_cells() {
        // 130 cells over 16 bands: R = 8, the trailing 2 cells are ignored.
        let index = LshIndex::new(16, 130);
        assert_eq!(index.rows_per_band(), 8);

        let mut first = vec![7u32; 130];
        let mut second = vec![7u32; 130];
        first[128] = 1;
        second[129] = 2;

        index.insert("tenant-a", "api-1", first).unwrap();
        let candidates = index.find_candidates("tenant-a", &second);
        assert!(candidates.contains("api-1"));
    }

    #[test]
    fn test_band_key_format() {
        assert_eq!(band_key(&[1, 2, 3, 4], 0, 2), "1_2_");
        assert_eq!(band_key(&[1, 2, 3, 4], 1, 2), "3_4_");
    }

    #[test]
    fn test_concurrent_reads_and_writes() {
        use std::sync::Arc;
        use std::thread;

        let index = Arc::new(LshIndex::with_defaults());
        let sig = signature_for(&[1, 2, 3]);

        let mut handles = Vec::new();
        for worker in 0..4 {
            let index = Arc::clone(&index);
            let sig = sig.clone();
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    let api_uuid = format!("api-{worker}-{i}");
                    index.insert("tenant-a", &api_uuid, sig.clone()).unwrap();
                    let results = index.find_similar("tenant-a", &sig, 0.95).unwrap();
                    assert!(results.iter().any(|r| r.api_uuid == api_uuid));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.len(), 200);
    }
}
