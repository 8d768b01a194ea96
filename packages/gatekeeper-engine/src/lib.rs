//! API similarity engine: MinHash signatures and LSH candidate retrieval.
//!
//! Turns an OpenAPI-style specification document into a compact fixed-width
//! signature and answers "which registered APIs look like this one?" through
//! a banded LSH index. Near-duplicate admission decisions are made on top of
//! this crate; policy (block/warn/version) stays with the caller.
//!
//! # Pipeline
//!
//! ```text
//! specification text
//!        │  pruning (boilerplate removal, canonical JSON)
//!        ▼
//! feature list (method+path tokens, schema tokens)
//!        │  shingling (word 3-grams, FNV-1a hashing)
//!        ▼
//! token set (u64)
//!        │  MinHash (H seeded hash functions)
//!        ▼
//! signature (H × u32)  ──►  LSH index / byte blob
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gatekeeper_engine::application::SignatureService;
//! use gatekeeper_engine::infrastructure::lsh::LshIndex;
//!
//! let service = SignatureService::default();
//! let dto = service.generate_signature(openapi_text, "uuid-1", "tenant-a")?;
//!
//! let index = LshIndex::with_defaults();
//! index.insert("tenant-a", "uuid-1", dto.signature_array().to_vec())?;
//! let similar = index.find_similar("tenant-a", dto.signature_array(), 0.95)?;
//! ```

pub mod application;
pub mod constants;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::{SignatureDto, SignatureService};
pub use domain::{ConflictReport, DedupResult, RulesetConfig};
pub use error::{ErrorKind, GatekeeperError, Result};
pub use infrastructure::lsh::{LshIndex, SimilarityResult};
pub use infrastructure::minhash::MinHashGenerator;
