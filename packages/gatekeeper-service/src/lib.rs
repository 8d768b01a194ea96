//! API gatekeeper orchestration.
//!
//! Wires the similarity engine to the durable signature store and exposes
//! the admission-time operations the governance layer calls: duplicate
//! checks, index maintenance on API create/update/delete, and startup
//! hydration of the in-memory LSH index from the store.
//!
//! ## Lifecycle
//!
//! ```rust,ignore
//! use gatekeeper_engine::RulesetConfig;
//! use gatekeeper_service::GatekeeperService;
//! use gatekeeper_storage::SqliteSignatureStore;
//!
//! let store = SqliteSignatureStore::new("gatekeeper.db")?;
//! let service = GatekeeperService::new(&RulesetConfig::default(), Box::new(store))?;
//! service.initialize()?; // hydrate the index, once, at startup
//!
//! let result = service.check_for_duplicates(openapi_text, "uuid-1", "tenant-a", 0.95)?;
//! if result.is_duplicate {
//!     // host policy decides: reject, warn, or version
//! }
//! ```

pub mod events;
pub mod service;

pub use events::{ApiEvent, DefinitionSource, GatekeeperEventHandler};
pub use service::GatekeeperService;
