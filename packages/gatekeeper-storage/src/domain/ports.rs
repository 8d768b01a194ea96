//! Store port implemented by persistence adapters.

use crate::domain::SignatureRecord;
use crate::error::Result;

/// Durable per-tenant signature persistence.
///
/// Implementations surface every failure as a `StorageError` carrying the
/// driver's message; retries and higher-level classification are the
/// caller's concern.
pub trait SignatureStore: Send + Sync {
    /// Inserts a new signature row.
    fn insert(&self, record: &SignatureRecord) -> Result<()>;

    /// Updates an existing row's blob and refreshes its updated timestamp.
    fn update(&self, record: &SignatureRecord) -> Result<()>;

    /// Inserts or updates based on a prior existence check. The check and
    /// the write are separate statements; concurrent admission of the same
    /// key is not expected.
    fn upsert(&self, record: &SignatureRecord) -> Result<()> {
        if self.exists(&record.api_uuid, &record.organization)? {
            self.update(record)
        } else {
            self.insert(record)
        }
    }

    /// Fetches one row by key.
    fn get(&self, api_uuid: &str, organization: &str) -> Result<Option<SignatureRecord>>;

    /// Fetches every row across all tenants. Used at startup to hydrate the
    /// in-memory index.
    fn get_all(&self) -> Result<Vec<SignatureRecord>>;

    /// Fetches every row for one tenant.
    fn get_all_by_organization(&self, organization: &str) -> Result<Vec<SignatureRecord>>;

    /// Deletes one row by key. Missing rows are not an error.
    fn delete(&self, api_uuid: &str, organization: &str) -> Result<()>;

    /// Deletes every row for one tenant.
    fn delete_all_by_organization(&self, organization: &str) -> Result<()>;

    /// Whether a row exists for the key.
    fn exists(&self, api_uuid: &str, organization: &str) -> Result<bool>;
}
