//! Row model for the signature table.

use chrono::{DateTime, Utc};

/// One persisted API signature, keyed by `(api_uuid, organization)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRecord {
    pub api_uuid: String,
    pub signature_blob: Vec<u8>,
    pub organization: String,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

impl SignatureRecord {
    /// Creates a record stamped with the current time.
    pub fn new(
        api_uuid: impl Into<String>,
        signature_blob: Vec<u8>,
        organization: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            api_uuid: api_uuid.into(),
            signature_blob,
            organization: organization.into(),
            created_time: now,
            updated_time: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let record = SignatureRecord::new("api-1", vec![0, 1, 2, 3], "tenant-a");
        assert_eq!(record.api_uuid, "api-1");
        assert_eq!(record.organization, "tenant-a");
        assert_eq!(record.signature_blob, vec![0, 1, 2, 3]);
        assert_eq!(record.created_time, record.updated_time);
    }
}
