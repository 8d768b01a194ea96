//! Durable signature storage for the API gatekeeper.
//!
//! One table, `AM_API_MINHASH`, keyed by `(API_UUID, ORGANIZATION)`, holding
//! the byte form of each MinHash signature plus created/updated timestamps.
//! The in-memory LSH index treats this store as the source of truth: it is
//! rebuilt from a full scan at startup, so the store must never lose rows
//! that the index believes exist.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gatekeeper_storage::{SignatureRecord, SignatureStore, SqliteSignatureStore};
//!
//! let store = SqliteSignatureStore::new("gatekeeper.db")?;
//! store.upsert(&SignatureRecord::new("uuid-1", blob, "tenant-a"))?;
//! let rows = store.get_all()?; // startup hydration
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::{SignatureRecord, SignatureStore};
pub use error::{ErrorKind, Result, StorageError};
pub use infrastructure::SqliteSignatureStore;
