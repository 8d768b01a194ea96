//! Deduplication ruleset configuration.
//!
//! Parsed from the YAML the governance layer supplies per ruleset.
//! Recognized keys: `enabled`, `similarity_threshold`,
//! `num_hash_functions`, `num_bands`; an optional `rules` mapping (custom
//! host rules) is not interpreted here.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_NUM_BANDS, DEFAULT_NUM_HASH_FUNCTIONS, DEFAULT_SIMILARITY_THRESHOLD,
    MAX_SIMILARITY_THRESHOLD, MIN_SIMILARITY_THRESHOLD,
};
use crate::error::{GatekeeperError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesetConfig {
    pub enabled: bool,
    pub similarity_threshold: f64,
    pub num_hash_functions: usize,
    pub num_bands: usize,
}

impl Default for RulesetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            num_hash_functions: DEFAULT_NUM_HASH_FUNCTIONS,
            num_bands: DEFAULT_NUM_BANDS,
        }
    }
}

impl RulesetConfig {
    /// Parses a ruleset YAML document. Unknown keys (including `rules`) are
    /// ignored; missing keys take their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            GatekeeperError::parse(format!("failed to parse ruleset configuration: {e}"))
                .with_source(e)
        })
    }

    /// Validates the configured values.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SIMILARITY_THRESHOLD..=MAX_SIMILARITY_THRESHOLD)
            .contains(&self.similarity_threshold)
        {
            return Err(GatekeeperError::invalid_input(format!(
                "similarity_threshold must be between {MIN_SIMILARITY_THRESHOLD:.2} and {MAX_SIMILARITY_THRESHOLD:.2}, got {:.2}",
                self.similarity_threshold
            )));
        }
        if self.num_hash_functions == 0 {
            return Err(GatekeeperError::invalid_input(
                "num_hash_functions must be positive",
            ));
        }
        if self.num_bands == 0 {
            return Err(GatekeeperError::invalid_input("num_bands must be positive"));
        }
        // Every band needs at least one row or all signatures share one key.
        if self.num_bands > self.num_hash_functions {
            return Err(GatekeeperError::invalid_input(format!(
                "num_bands ({}) must not exceed num_hash_functions ({})",
                self.num_bands, self.num_hash_functions
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = RulesetConfig::default();
        assert!(config.enabled);
        assert_eq!(config.similarity_threshold, 0.95);
        assert_eq!(config.num_hash_functions, 128);
        assert_eq!(config.num_bands, 16);
        config.validate().unwrap();
    }

    #[test]
    fn test_from_yaml() {
        let config = RulesetConfig::from_yaml(
            "enabled: true\nsimilarity_threshold: 0.85\nnum_hash_functions: 64\nnum_bands: 8\n",
        )
        .unwrap();
        assert_eq!(config.similarity_threshold, 0.85);
        assert_eq!(config.num_hash_functions, 64);
        assert_eq!(config.num_bands, 8);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = RulesetConfig::from_yaml("similarity_threshold: 0.9\n").unwrap();
        assert!(config.enabled);
        assert_eq!(config.similarity_threshold, 0.9);
        assert_eq!(config.num_bands, 16);
    }

    #[test]
    fn test_rules_mapping_is_ignored() {
        let config = RulesetConfig::from_yaml(
            "enabled: false\nrules:\n  custom-check:\n    description: host rule\n    severity: warn\n",
        )
        .unwrap();
        assert!(!config.enabled);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let config = RulesetConfig::from_yaml("similarity_threshold: 0.3\n").unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        let config = RulesetConfig::from_yaml("similarity_threshold: 1.2\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_hash_functions_rejected() {
        let config = RulesetConfig::from_yaml("num_hash_functions: 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_bands_rejected() {
        let config = RulesetConfig::from_yaml("num_bands: 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_more_bands_than_hash_functions_rejected() {
        let config =
            RulesetConfig::from_yaml("num_bands: 200\nnum_hash_functions: 128\n").unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        // One row per band is the minimum valid banding.
        let config =
            RulesetConfig::from_yaml("num_bands: 128\nnum_hash_functions: 128\n").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = RulesetConfig::from_yaml("enabled: [unclosed\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }
}
