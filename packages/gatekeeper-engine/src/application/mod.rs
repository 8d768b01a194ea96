//! Application layer: the signature generation pipeline.

pub mod signature_service;

pub use signature_service::{SignatureDto, SignatureService};
