//! Chat agent turns over the in-memory stack.

use async_trait::async_trait;
use parking_lot::Mutex;
use ragmind_agent::ChatAgent;
use ragmind_core::{MemoryAttributes, MemoryType, StylePreference};
use ragmind_integration_tests::{Harness, ScriptedSummarizer};
use ragmind_providers::{ChatOptions, ChatResponse, Message, Provider, StopReason, Usage};
use std::sync::Arc;

/// Answers every question with a fixed line and records each system prompt.
#[derive(Default)]
struct PromptRecorder {
    systems: Mutex<Vec<String>>,
}

impl PromptRecorder {
    fn last_system(&self) -> String {
        self.systems.lock().last().cloned().unwrap_or_default()
    }

    fn calls(&self) -> usize {
        self.systems.lock().len()
    }
}

#[async_trait]
impl Provider for PromptRecorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        _options: Option<ChatOptions>,
    ) -> ragmind_providers::Result<ChatResponse> {
        self.systems.lock().push(messages[0].content.clone());
        Ok(ChatResponse {
            id: "resp".to_string(),
            model: model.to_string(),
            content: "Borrowing lets you use a value without taking ownership of it.".to_string(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }
}

fn agent(harness: &Harness) -> (Arc<PromptRecorder>, ChatAgent) {
    let provider = Arc::new(PromptRecorder::default());
    let agent = ChatAgent::new(harness.memory.clone(), provider.clone());
    (provider, agent)
}

#[tokio::test]
async fn test_turn_uses_facts_and_archives_exchange() {
    let harness = Harness::new();
    harness
        .memory
        .add_memory(
            "learning Rust borrowing rules",
            MemoryType::Fact,
            MemoryAttributes::for_user("alice_01"),
        )
        .await
        .unwrap();
    let (provider, agent) = agent(&harness);

    let reply = agent
        .generate_response("alice_01", "explain Rust borrowing rules")
        .await
        .unwrap();

    assert!(!reply.from_cache);
    assert!(reply.interaction.episode_id.is_some());
    assert!(provider.last_system().contains("learning Rust borrowing rules"));
    assert_eq!(harness.memory.short_term().len("alice_01"), 2);
}

#[tokio::test]
async fn test_facts_never_cross_users() {
    let harness = Harness::new();
    harness
        .memory
        .add_memory("secret project codename Falcon", MemoryType::Fact, MemoryAttributes::for_user("bob"))
        .await
        .unwrap();
    let (provider, agent) = agent(&harness);

    agent
        .generate_response("alice_01", "secret project codename Falcon")
        .await
        .unwrap();

    assert!(!provider.last_system().contains("Falcon"));
}

#[tokio::test]
async fn test_repeated_question_is_served_from_cache() {
    let harness = Harness::new();
    let (provider, agent) = agent(&harness);

    let first = agent.generate_response("alice_01", "what is borrowing").await.unwrap();
    let second = agent.generate_response("alice_01", "what is borrowing").await.unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.content, second.content);
    assert_eq!(provider.calls(), 1);

    let other = agent.generate_response("bob", "what is borrowing").await.unwrap();
    assert!(!other.from_cache);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_preference_change_reaches_the_prompt() {
    let harness = Harness::with_summarizer(ScriptedSummarizer::default());
    let (provider, agent) = agent(&harness);

    agent
        .generate_response("alice_01", "Please be concise. What is a lifetime?")
        .await
        .unwrap();

    assert!(provider.last_system().contains("style: concise"));
    assert_eq!(
        harness.memory.get_profile("alice_01").await.style_preference,
        StylePreference::Concise
    );
}

#[tokio::test]
async fn test_reset_clears_cached_answers() {
    let harness = Harness::new();
    let (provider, agent) = agent(&harness);

    agent.generate_response("alice_01", "what is borrowing").await.unwrap();
    harness.memory.reset_memory("alice_01").await.unwrap();
    let again = agent.generate_response("alice_01", "what is borrowing").await.unwrap();

    assert!(!again.from_cache);
    assert_eq!(provider.calls(), 2);
}
