//! Memory-aware chat agent for ragmind.
//!
//! This crate provides:
//! - [`LlmSummarizer`], the model-backed implementation of the memory
//!   crate's summarizer contract
//! - System prompt assembly from a profile and retrieved memories
//! - [`ChatAgent`], which answers one user turn end to end

pub mod error;
pub mod prompt;
pub mod runtime;
pub mod summarizer;

pub use error::AgentError;
pub use runtime::{AgentReply, ChatAgent, RuntimeConfig};
pub use summarizer::LlmSummarizer;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
