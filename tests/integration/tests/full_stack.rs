//! The HTTP clients wired together against mocked OpenAI-compatible endpoints.

use ragmind_agent::{ChatAgent, LlmSummarizer};
use ragmind_core::{MemoryType, StylePreference};
use ragmind_integration_tests::test_config;
use ragmind_memory::{InMemoryIndex, MemoryManager, OpenAIEmbeddings, RecallQuery};
use ragmind_providers::OpenAIProvider;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIM: usize = 4;

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5}
    })
}

#[tokio::test]
async fn test_turn_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.5, 0.5, 0.5, 0.5]}]
        })))
        .mount(&server)
        .await;

    // Profile analysis asks for JSON output.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("json_object"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("{\"style_preference\": \"concise\"}")),
        )
        .mount(&server)
        .await;

    // The answer carries the memory-aware system prompt.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("long-term memory of this user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "A trait object is a pointer to a value plus a vtable for its trait methods.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.embeddings.dimension = DIM;

    let provider = Arc::new(
        OpenAIProvider::new("test-key")
            .unwrap()
            .with_base_url(format!("{}/v1", server.uri())),
    );
    let embedder = Arc::new(
        OpenAIEmbeddings::new("test-key")
            .unwrap()
            .with_base_url(server.uri())
            .with_dimension(DIM),
    );
    let summarizer = Arc::new(LlmSummarizer::new(provider.clone(), "gpt-4o-mini"));
    let memory = Arc::new(MemoryManager::new(
        Arc::new(InMemoryIndex::new()),
        embedder,
        summarizer,
        &config,
    ));
    let agent = ChatAgent::new(memory.clone(), provider);

    let reply = agent
        .generate_response("alice_01", "Keep it brief: what is a trait object?")
        .await
        .unwrap();

    assert!(reply.content.starts_with("A trait object"));
    assert!(reply.interaction.is_clean());
    assert!(reply.interaction.episode_id.is_some());
    assert_eq!(
        memory.get_profile("alice_01").await.style_preference,
        StylePreference::Concise
    );

    let episodes = memory
        .retrieve_relevant(&RecallQuery::new("trait object", "alice_01").with_type(MemoryType::Episodic))
        .await
        .unwrap();
    assert_eq!(episodes.len(), 1);
}
