//! Model-backed interaction analysis.
//!
//! Every call asks the model for a single JSON object and reads the reply
//! from its first `{` to its last `}`, so chatty wrappers around the object
//! are tolerated.

use async_trait::async_trait;
use ragmind_core::{ExplanationDepth, ProfileDelta, RiskTolerance, StylePreference, UserProfile};
use ragmind_memory::{ChatSummary, MemoryError, Summarizer};
use ragmind_providers::{ChatOptions, Message, Provider};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

type Result<T> = ragmind_memory::Result<T>;

const DELTA_PROMPT: &str = "You watch a conversation between a user and an assistant and detect \
changes to the user's stated preferences. Reply with one JSON object containing only the fields \
that the latest exchange clearly changes:\n\
- risk_tolerance: one of \"low\", \"medium\", \"high\"\n\
- explanation_depth: one of \"simple\", \"detailed\", \"technical\"\n\
- style_preference: one of \"formal\", \"casual\", \"concise\"\n\
Reply with {} when nothing changes. Never repeat a value that matches the current profile.";

const SUMMARY_PROMPT: &str = "Extract durable facts about the user from the conversation: \
preferences, goals, background, constraints. Skip small talk and anything about the assistant. \
Each fact is one short standalone sentence. Reply with one JSON object: \
{\"key_facts\": [\"...\"]}. Use an empty list when there is nothing worth keeping.";

const DEDUP_PROMPT: &str = "Merge two lists of facts about the same user into one list. Drop \
duplicates and near-duplicates, and when facts conflict keep the newer one from the second list. \
Keep the wording of existing facts unless they are superseded. Reply with one JSON object: \
{\"facts\": [\"...\"]}.";

/// The substring from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let object = extract_json_object(reply)
        .ok_or_else(|| MemoryError::summarizer("reply contains no JSON object"))?;
    serde_json::from_str(object).map_err(|e| MemoryError::summarizer(format!("unparseable reply: {}", e)))
}

fn field<T: FromStr>(object: &serde_json::Map<String, Value>, name: &str) -> Option<T> {
    let raw = object.get(name)?.as_str()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {} value '{}'", name, raw);
            None
        }
    }
}

/// Parse a delta reply, dropping fields with unknown values.
pub fn parse_delta(reply: &str) -> Result<ProfileDelta> {
    let object: serde_json::Map<String, Value> = parse_reply(reply)?;
    Ok(ProfileDelta {
        risk_tolerance: field::<RiskTolerance>(&object, "risk_tolerance"),
        explanation_depth: field::<ExplanationDepth>(&object, "explanation_depth"),
        style_preference: field::<StylePreference>(&object, "style_preference"),
    })
}

#[derive(Deserialize)]
struct FactList {
    #[serde(default)]
    facts: Vec<String>,
}

/// [`Summarizer`] over a chat model.
pub struct LlmSummarizer {
    provider: Arc<dyn Provider>,
    model: String,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    async fn ask(&self, system: &str, user: String) -> Result<String> {
        let messages = [Message::system(system), Message::user(user)];
        let options = ChatOptions::with_max_tokens(1024).temperature(0.0).json();

        let response = self
            .provider
            .chat(&self.model, &messages, Some(options))
            .await
            .map_err(|e| MemoryError::summarizer(e.to_string()))?;
        debug!("Summarizer reply: {} chars", response.content.len());
        Ok(response.content)
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn analyze_interaction_delta(
        &self,
        current: &UserProfile,
        user_msg: &str,
        agent_msg: &str,
    ) -> Result<ProfileDelta> {
        let prompt = format!(
            "Current profile:\n{}\n\nLatest exchange:\nUser: {}\nAgent: {}",
            serde_json::to_string(current)?,
            user_msg,
            agent_msg
        );
        let reply = self.ask(DELTA_PROMPT, prompt).await?;
        parse_delta(&reply)
    }

    async fn summarize(&self, history: &[String]) -> Result<ChatSummary> {
        if history.is_empty() {
            return Ok(ChatSummary::default());
        }
        let reply = self
            .ask(SUMMARY_PROMPT, format!("Conversation:\n{}", history.join("\n")))
            .await?;
        parse_reply(&reply)
    }

    async fn deduplicate_facts(&self, existing: &[String], candidates: &[String]) -> Result<Vec<String>> {
        if existing.is_empty() && candidates.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = format!(
            "Existing facts:\n{}\n\nNew facts:\n{}",
            serde_json::to_string(existing)?,
            serde_json::to_string(candidates)?
        );
        let reply = self.ask(DEDUP_PROMPT, prompt).await?;
        let list: FactList = parse_reply(&reply)?;
        Ok(list.facts)
    }
}
