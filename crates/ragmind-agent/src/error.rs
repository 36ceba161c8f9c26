//! Agent error types.

use ragmind_memory::MemoryError;
use ragmind_providers::ProviderError;
use thiserror::Error;

/// Errors that can occur while answering a turn.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Memory layer error.
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    /// Model provider error.
    #[error("Model API error: {0}")]
    Provider(#[from] ProviderError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rejected input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }
}
