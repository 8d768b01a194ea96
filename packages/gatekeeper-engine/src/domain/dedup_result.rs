//! Result of a duplicate check.

use serde::{Deserialize, Serialize};

use crate::domain::ConflictReport;

/// Outcome of checking one API against the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupResult {
    pub is_duplicate: bool,
    pub high_confidence: bool,
    pub conflict_reports: Vec<ConflictReport>,
    pub query_api_uuid: String,
    pub organization: String,
    pub threshold: f64,
    pub message: String,
}

impl DedupResult {
    /// A result indicating no duplicates were found.
    pub fn unique(query_api_uuid: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            is_duplicate: false,
            high_confidence: false,
            conflict_reports: Vec::new(),
            query_api_uuid: query_api_uuid.into(),
            organization: organization.into(),
            threshold: 0.0,
            message: "No duplicate APIs found. API is unique.".to_string(),
        }
    }

    /// A result carrying the matched duplicates.
    pub fn duplicate(
        query_api_uuid: impl Into<String>,
        organization: impl Into<String>,
        conflict_reports: Vec<ConflictReport>,
        high_confidence: bool,
    ) -> Self {
        let message = if high_confidence {
            "High-confidence duplicate detected (>95% similarity). \
             Consider reusing the existing API or creating a new version."
        } else {
            "Potential duplicate APIs detected. Review the conflict reports for details."
        };

        Self {
            is_duplicate: true,
            high_confidence,
            conflict_reports,
            query_api_uuid: query_api_uuid.into(),
            organization: organization.into(),
            threshold: 0.0,
            message: message.to_string(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}
