//! Domain models: conflict reports, deduplication results, ruleset config.

pub mod conflict;
pub mod dedup_result;
pub mod ruleset_config;

pub use conflict::ConflictReport;
pub use dedup_result::DedupResult;
pub use ruleset_config::RulesetConfig;
