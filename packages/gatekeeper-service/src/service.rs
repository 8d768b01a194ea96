//! Deduplication service: duplicate checks and index/store maintenance.

use std::sync::Mutex;

use tracing::{debug, info, warn};

use gatekeeper_engine::constants::{
    DEFAULT_SEED, DEFAULT_SIMILARITY_THRESHOLD, HIGH_CONFIDENCE_THRESHOLD,
    MAX_SIMILARITY_THRESHOLD, MIN_SIMILARITY_THRESHOLD,
};
use gatekeeper_engine::infrastructure::minhash;
use gatekeeper_engine::{
    ConflictReport, DedupResult, GatekeeperError, LshIndex, Result, RulesetConfig, SignatureService,
};
use gatekeeper_storage::{SignatureRecord, SignatureStore, StorageError};

/// Main service for API deduplication.
///
/// Owns the in-memory LSH index, the signature pipeline and a handle to the
/// durable store. The index is a cache of the store: `initialize()` rebuilds
/// it from a full scan, and admission operations write to both without
/// cross-undo, so a crash between the two writes is repaired on the next
/// startup.
///
/// Construct one value at program start and share it; all operations take
/// `&self` and serialize only on the index's internal lock.
pub struct GatekeeperService {
    index: LshIndex,
    signature_service: SignatureService,
    store: Box<dyn SignatureStore>,
    initialized: Mutex<bool>,
}

fn storage_err(err: StorageError) -> GatekeeperError {
    GatekeeperError::storage(err.to_string()).with_source(err)
}

impl GatekeeperService {
    /// Creates a service sized from the ruleset configuration.
    ///
    /// The configuration is validated first; zero or degenerate banding
    /// (more bands than hash functions) is rejected with `InvalidInput`.
    pub fn new(config: &RulesetConfig, store: Box<dyn SignatureStore>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            index: LshIndex::new(config.num_bands, config.num_hash_functions),
            signature_service: SignatureService::new(config.num_hash_functions, DEFAULT_SEED),
            store,
            initialized: Mutex::new(false),
        })
    }

    /// Creates a service with the default configuration (H=128, B=16).
    pub fn with_defaults(store: Box<dyn SignatureStore>) -> Result<Self> {
        Self::new(&RulesetConfig::default(), store)
    }

    /// Hydrates the LSH index from the store. Call once at startup, before
    /// admission queries; repeated calls are no-ops.
    ///
    /// Rows whose blob fails to decode, or whose width does not match the
    /// configured hash count, are logged and skipped: partial hydration
    /// beats refusing to start, and a skipped entry is rebuilt the next time
    /// that API is admitted.
    pub fn initialize(&self) -> Result<()> {
        let mut initialized = self.initialized.lock().unwrap();
        if *initialized {
            info!("gatekeeper service already initialized");
            return Ok(());
        }

        info!("initializing gatekeeper service: hydrating LSH index from store");
        self.index.clear();

        let records = self.store.get_all().map_err(storage_err)?;
        let total = records.len();
        let mut loaded = 0usize;

        for record in records {
            let signature = match minhash::bytes_to_signature(&record.signature_blob) {
                Ok(signature) => signature,
                Err(e) => {
                    warn!(api_uuid = %record.api_uuid, error = %e, "skipping corrupt stored signature");
                    continue;
                }
            };
            match self
                .index
                .insert(&record.organization, &record.api_uuid, signature)
            {
                Ok(()) => loaded += 1,
                Err(e) => {
                    warn!(api_uuid = %record.api_uuid, error = %e, "skipping stored signature");
                }
            }
        }

        info!(loaded, total, "hydrated LSH index");
        *initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        *self.initialized.lock().unwrap()
    }

    /// Lifecycle counterpart to `initialize()`. The SQLite store closes on
    /// drop, so this only marks the service as uninitialized.
    pub fn shutdown(&self) {
        let mut initialized = self.initialized.lock().unwrap();
        *initialized = false;
        info!("gatekeeper service shut down");
    }

    /// Checks whether an API is a near-duplicate of an already-indexed API
    /// in the same organization.
    ///
    /// Thresholds outside `[0.5, 1.0]` silently fall back to the default
    /// (0.95). The query's own `api_uuid` never appears among the matches,
    /// so re-checking an indexed API does not flag itself; callers must pass
    /// the API's real id for that filter to work. The signature is generated
    /// but not inserted.
    pub fn check_for_duplicates(
        &self,
        definition: &str,
        api_uuid: &str,
        organization: &str,
        threshold: f64,
    ) -> Result<DedupResult> {
        let threshold = if (MIN_SIMILARITY_THRESHOLD..=MAX_SIMILARITY_THRESHOLD)
            .contains(&threshold)
        {
            threshold
        } else {
            DEFAULT_SIMILARITY_THRESHOLD
        };

        let dto = self
            .signature_service
            .generate_signature(definition, api_uuid, organization)?;

        let mut matches =
            self.index
                .find_similar(organization, dto.signature_array(), threshold)?;
        matches.retain(|m| m.api_uuid != api_uuid);

        if matches.is_empty() {
            return Ok(DedupResult::unique(api_uuid, organization).with_threshold(threshold));
        }

        let high_confidence = matches
            .iter()
            .any(|m| m.similarity >= HIGH_CONFIDENCE_THRESHOLD);

        let conflict_reports = matches
            .into_iter()
            .map(|m| {
                let recommendation = if m.similarity >= HIGH_CONFIDENCE_THRESHOLD {
                    "Consider reusing the existing API or creating a new version"
                } else {
                    "Review the similar API to ensure this is not a duplicate"
                };
                ConflictReport::new(m.api_uuid, m.similarity)
                    .with_message(format!(
                        "API has {:.1}% similarity with existing API",
                        m.similarity * 100.0
                    ))
                    .with_recommendation(recommendation)
            })
            .collect();

        Ok(
            DedupResult::duplicate(api_uuid, organization, conflict_reports, high_confidence)
                .with_threshold(threshold),
        )
    }

    /// Generates the API's signature, inserts it into the LSH index and
    /// upserts it into the store.
    ///
    /// Both side effects are attempted in that order; the first failure is
    /// surfaced and the other write is not rolled back. The index is a cache
    /// of the store, so any divergence is bounded by the next `initialize()`.
    pub fn index_api(&self, definition: &str, api_uuid: &str, organization: &str) -> Result<()> {
        let dto = self
            .signature_service
            .generate_signature(definition, api_uuid, organization)?;

        self.index
            .insert(organization, api_uuid, dto.signature_array().to_vec())?;
        self.store
            .upsert(&SignatureRecord::new(
                api_uuid,
                dto.signature_blob().to_vec(),
                organization,
            ))
            .map_err(storage_err)?;

        debug!(api_uuid, organization, "indexed API");
        Ok(())
    }

    /// Replaces an API's signature in the index and the store.
    pub fn update_api(&self, definition: &str, api_uuid: &str, organization: &str) -> Result<()> {
        self.index.remove(api_uuid);

        let dto = self
            .signature_service
            .generate_signature(definition, api_uuid, organization)?;

        self.index
            .insert(organization, api_uuid, dto.signature_array().to_vec())?;
        self.store
            .upsert(&SignatureRecord::new(
                api_uuid,
                dto.signature_blob().to_vec(),
                organization,
            ))
            .map_err(storage_err)?;

        debug!(api_uuid, organization, "updated API in index");
        Ok(())
    }

    /// Removes an API from the index and deletes its stored signature.
    pub fn remove_api(&self, api_uuid: &str, organization: &str) -> Result<()> {
        self.index.remove(api_uuid);
        self.store
            .delete(api_uuid, organization)
            .map_err(storage_err)?;

        debug!(api_uuid, organization, "removed API from index");
        Ok(())
    }

    pub fn contains_api(&self, api_uuid: &str) -> bool {
        self.index.contains(api_uuid)
    }

    pub fn index_size(&self) -> usize {
        self.index.len()
    }

    /// The underlying LSH index (read access for tests and diagnostics).
    pub fn index(&self) -> &LshIndex {
        &self.index
    }

    /// The signature pipeline.
    pub fn signature_service(&self) -> &SignatureService {
        &self.signature_service
    }
}
