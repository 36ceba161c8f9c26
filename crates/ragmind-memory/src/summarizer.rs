//! Interaction analysis contract.

use crate::Result;
use async_trait::async_trait;
use ragmind_core::{ProfileDelta, UserProfile};
use serde::{Deserialize, Serialize};

/// Facts distilled from a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    #[serde(default)]
    pub key_facts: Vec<String>,
}

/// Extracts profile changes and durable facts from conversations.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Preference changes implied by the latest exchange. An empty delta
    /// means nothing changed.
    async fn analyze_interaction_delta(
        &self,
        current: &UserProfile,
        user_msg: &str,
        agent_msg: &str,
    ) -> Result<ProfileDelta>;

    /// Summarize a transcript into key facts.
    async fn summarize(&self, history: &[String]) -> Result<ChatSummary>;

    /// Merge candidate facts into the existing set, returning the full
    /// deduplicated list that should be stored.
    async fn deduplicate_facts(&self, existing: &[String], candidates: &[String]) -> Result<Vec<String>>;
}
