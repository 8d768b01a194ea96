//! Storage domain: the signature row model and the store port.

pub mod models;
pub mod ports;

pub use models::SignatureRecord;
pub use ports::SignatureStore;
