//! Signature generation pipeline: prune → extract → shingle → MinHash.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEFAULT_NUM_HASH_FUNCTIONS, DEFAULT_SEED, NGRAM_SIZE};
use crate::error::{GatekeeperError, Result};
use crate::infrastructure::minhash::{self, MinHashGenerator};
use crate::infrastructure::{pruning, shingling};

/// An API signature in the formats callers need: cell array for the index,
/// byte blob for the store, Base64 for the wire, plus pipeline counts for
/// diagnostics.
///
/// The raw blob is not part of the JSON form; remote consumers use the
/// Base64 field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureDto {
    pub api_uuid: String,
    pub organization: String,
    pub signature_array: Vec<u32>,
    pub signature_base64: String,
    pub num_hash_functions: usize,
    pub feature_count: usize,
    pub shingle_count: usize,

    #[serde(skip)]
    signature_blob: Vec<u8>,
}

impl SignatureDto {
    pub fn signature_array(&self) -> &[u32] {
        &self.signature_array
    }

    /// The big-endian byte form of the signature. Empty on DTOs
    /// deserialized from JSON; decode `signature_base64` instead.
    pub fn signature_blob(&self) -> &[u8] {
        &self.signature_blob
    }
}

/// Runs the deterministic specification → signature pipeline.
pub struct SignatureService {
    generator: MinHashGenerator,
    num_hash_functions: usize,
}

impl SignatureService {
    pub fn new(num_hash_functions: usize, seed: u64) -> Self {
        Self {
            generator: MinHashGenerator::new(num_hash_functions, seed),
            num_hash_functions,
        }
    }

    pub fn num_hash_functions(&self) -> usize {
        self.num_hash_functions
    }

    pub fn generator(&self) -> &MinHashGenerator {
        &self.generator
    }

    /// Generates a signature DTO from a specification document.
    pub fn generate_signature(
        &self,
        definition: &str,
        api_uuid: &str,
        organization: &str,
    ) -> Result<SignatureDto> {
        let pruned = pruning::prune_definition(definition)?;
        let features = pruning::extract_features(&pruned)?;
        let shingles =
            shingling::shingles_from_features(features.iter().map(String::as_str), NGRAM_SIZE);

        debug!(
            api_uuid,
            features = features.len(),
            shingles = shingles.len(),
            "generated signature"
        );

        Ok(self.build_dto(api_uuid, organization, features.len(), &shingles))
    }

    /// Generates a signature DTO from pre-extracted features.
    pub fn generate_signature_from_features(
        &self,
        features: &[String],
        api_uuid: &str,
        organization: &str,
    ) -> SignatureDto {
        let shingles =
            shingling::shingles_from_features(features.iter().map(String::as_str), NGRAM_SIZE);
        self.build_dto(api_uuid, organization, features.len(), &shingles)
    }

    fn build_dto(
        &self,
        api_uuid: &str,
        organization: &str,
        feature_count: usize,
        shingles: &HashSet<String>,
    ) -> SignatureDto {
        let signature = self.generator.compute_signature_from_strings(shingles);
        let blob = minhash::signature_to_bytes(&signature);
        let signature_base64 = BASE64.encode(&blob);

        SignatureDto {
            api_uuid: api_uuid.to_string(),
            organization: organization.to_string(),
            signature_array: signature,
            signature_base64,
            num_hash_functions: self.num_hash_functions,
            feature_count,
            shingle_count: shingles.len(),
            signature_blob: blob,
        }
    }

    /// Serializes a DTO to its JSON wire form.
    pub fn to_json(&self, dto: &SignatureDto) -> Result<String> {
        serde_json::to_string(dto)
            .map_err(|e| GatekeeperError::internal("failed to serialize signature DTO").with_source(e))
    }

    /// Parses a DTO from its JSON wire form.
    pub fn from_json(&self, json: &str) -> Result<SignatureDto> {
        serde_json::from_str(json)
            .map_err(|e| GatekeeperError::parse("failed to parse signature DTO").with_source(e))
    }

    /// Estimates Jaccard similarity between two signatures.
    pub fn estimate_similarity(&self, first: &[u32], second: &[u32]) -> Result<f64> {
        minhash::estimate_similarity(first, second)
    }
}

impl Default for SignatureService {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_HASH_FUNCTIONS, DEFAULT_SEED)
    }
}
