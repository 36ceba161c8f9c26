//! Chat model providers for ragmind.
//!
//! The agent and the summarizer talk to language models through the
//! [`Provider`] trait. One implementation ships here: any endpoint speaking
//! the OpenAI chat-completions protocol.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragmind_providers::{Provider, OpenAIProvider, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenAIProvider::from_env()?;
//!     let messages = vec![Message::user("Hello!")];
//!     let response = provider.chat("gpt-4o-mini", &messages, None).await?;
//!     println!("Response: {}", response.content);
//!     Ok(())
//! }
//! ```

mod error;
mod types;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAIProvider;

pub use error::{ProviderError, Result};
pub use types::*;

use async_trait::async_trait;

/// A model provider that can generate chat completions.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get provider name.
    fn name(&self) -> &str;

    /// Generate a chat completion.
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<ChatOptions>,
    ) -> Result<ChatResponse>;
}
