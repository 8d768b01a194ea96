//! Conflict report for a matched near-duplicate API.

use serde::{Deserialize, Serialize};

/// One matched API in a deduplication result.
///
/// `matched_api_uuid` and `similarity_score` are always present; the
/// descriptive fields are populated when the host resolves them and the
/// per-family similarity breakdowns when a detailed comparison ran. Absent
/// fields are omitted from the wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub matched_api_uuid: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_api_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_api_context: Option<String>,

    pub similarity_score: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_similarity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_similarity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_similarity: Option<f64>,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub recommendation: String,
}

impl ConflictReport {
    pub fn new(matched_api_uuid: impl Into<String>, similarity_score: f64) -> Self {
        Self {
            matched_api_uuid: matched_api_uuid.into(),
            matched_api_name: None,
            matched_api_version: None,
            matched_api_context: None,
            similarity_score,
            path_similarity: None,
            schema_similarity: None,
            metadata_similarity: None,
            message: String::new(),
            recommendation: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.matched_api_name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.matched_api_version = Some(version.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.matched_api_context = Some(context.into());
        self
    }

    pub fn with_path_similarity(mut self, similarity: f64) -> Self {
        self.path_similarity = Some(similarity);
        self
    }

    pub fn with_schema_similarity(mut self, similarity: f64) -> Self {
        self.schema_similarity = Some(similarity);
        self
    }

    pub fn with_metadata_similarity(mut self, similarity: f64) -> Self {
        self.metadata_similarity = Some(similarity);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let report = ConflictReport::new("api-1", 0.97)
            .with_name("Petstore")
            .with_version("1.0")
            .with_message("API has 97.0% similarity with existing API")
            .with_recommendation("Consider reusing the existing API");

        assert_eq!(report.matched_api_uuid, "api-1");
        assert_eq!(report.similarity_score, 0.97);
        assert_eq!(report.matched_api_name.as_deref(), Some("Petstore"));
        assert!(report.matched_api_context.is_none());
    }

    #[test]
    fn test_wire_format_uses_camel_case_and_omits_absent_fields() {
        let report = ConflictReport::new("api-1", 1.0).with_message("exact match");
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["matchedApiUuid"], "api-1");
        assert_eq!(json["similarityScore"], 1.0);
        assert_eq!(json["message"], "exact match");
        assert!(json.get("matchedApiName").is_none());
        assert!(json.get("pathSimilarity").is_none());
    }

    #[test]
    fn test_wire_round_trip() {
        let report = ConflictReport::new("api-1", 0.96)
            .with_context("/pets")
            .with_path_similarity(0.9);
        let json = serde_json::to_string(&report).unwrap();
        let back: ConflictReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
