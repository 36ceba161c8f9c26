//! Memory error types.

use ragmind_core::MemoryType;
use thiserror::Error;

/// Errors that can occur during memory operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Embedding generation failed.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index error.
    #[error("Index error: {0}")]
    Index(String),

    /// Summarizer failed.
    #[error("Summarizer error: {0}")]
    Summarizer(String),

    /// A user-scoped memory was submitted without an owner.
    #[error("Refusing to store {0} memory without a user_id")]
    MissingUserId(MemoryType),

    /// Nothing to store.
    #[error("Memory content is empty")]
    EmptyContent,

    /// Stored metadata could not be decoded.
    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    /// Some persisted deletions failed while local state was cleared.
    #[error("Reset incomplete for {user_id}: {failures}")]
    PartialReset { user_id: String, failures: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MemoryError {
    /// Create an index error.
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }

    /// Create a summarizer error.
    pub fn summarizer(message: impl Into<String>) -> Self {
        Self::Summarizer(message.into())
    }

    /// Create a corrupt-record error.
    pub fn corrupt(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
