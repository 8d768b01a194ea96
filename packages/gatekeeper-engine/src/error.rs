//! Error types for the similarity engine.

use std::fmt;
use thiserror::Error;

/// Engine error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before processing (empty spec, non-object root,
    /// out-of-range configuration).
    InvalidInput,
    /// The underlying JSON/YAML parser rejected the document.
    Parse,
    /// The persistence layer failed.
    Storage,
    /// A stored signature blob could not be decoded.
    CorruptSignature,
    /// A signature's width does not match the configured hash count.
    LengthMismatch,
    /// Anything unclassified (bugs).
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Parse => "parse",
            ErrorKind::Storage => "storage",
            ErrorKind::CorruptSignature => "corrupt_signature",
            ErrorKind::LengthMismatch => "length_mismatch",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Engine error type.
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct GatekeeperError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl GatekeeperError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn corrupt_signature(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CorruptSignature, message)
    }

    pub fn length_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LengthMismatch, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, GatekeeperError>;
