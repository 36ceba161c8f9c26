//! Memory manager scenarios over the public API.

use ragmind_cli::session::{self, LoginError, LoginFlow};
use ragmind_core::{MemoryAttributes, MemoryType, RiskTolerance, StylePreference, UserProfile, UserStatus};
use ragmind_integration_tests::{Harness, ScriptedSummarizer};
use ragmind_memory::{MemoryError, RecallQuery};

const MEMORY_NS: &str = "memory_store";
const PROFILE_NS: &str = "user_profiles";

async fn fact_texts(harness: &Harness, user: &str) -> Vec<String> {
    let recall = RecallQuery::new("general user facts", user)
        .with_type(MemoryType::Fact)
        .with_limit(50)
        .with_threshold(0.0);
    let mut facts: Vec<String> = harness
        .memory
        .retrieve_relevant(&recall)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.item.content)
        .collect();
    facts.sort();
    facts
}

#[tokio::test]
async fn test_alice_signup_flow() {
    let harness = Harness::new();
    let profiles = harness.memory.profiles();

    assert_eq!(profiles.check_user_status("alice_01").await, UserStatus::New);
    assert_eq!(
        session::authenticate(profiles, "alice_01", true).await,
        Ok(LoginFlow::SetupProfile)
    );

    let chosen = UserProfile::new("alice_01")
        .with_risk_tolerance(RiskTolerance::Low)
        .with_style_preference(StylePreference::Casual);
    session::save_new_profile(profiles, &chosen).await.unwrap();

    assert_eq!(profiles.check_user_status("alice_01").await, UserStatus::Old);
    assert_eq!(
        session::authenticate(profiles, "alice_01", true).await,
        Err(LoginError::AlreadyTaken("alice_01".to_string()))
    );
    assert_eq!(
        session::authenticate(profiles, "alice_01", false).await,
        Ok(LoginFlow::Resume)
    );
    assert_eq!(harness.memory.get_profile("alice_01").await, chosen);
}

#[tokio::test]
async fn test_returning_login_for_unknown_user() {
    let harness = Harness::new();
    let err = session::authenticate(harness.memory.profiles(), "nobody", false)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Profile not found for 'nobody'. Please select 'New User' to create an account."
    );
}

#[tokio::test]
async fn test_consolidation_stores_exactly_the_summary_and_is_idempotent() {
    let harness = Harness::with_summarizer(ScriptedSummarizer::with_facts(&["likes concise answers"]));
    let history = vec![
        "User: keep it short please".to_string(),
        "Agent: Will do.".to_string(),
    ];

    let stored = harness.memory.consolidate_session("alice_01", &history).await.unwrap();
    assert_eq!(stored, 1);
    assert_eq!(fact_texts(&harness, "alice_01").await, vec!["likes concise answers"]);

    let stored = harness.memory.consolidate_session("alice_01", &history).await.unwrap();
    assert_eq!(stored, 1);
    assert_eq!(fact_texts(&harness, "alice_01").await, vec!["likes concise answers"]);
}

#[tokio::test]
async fn test_consolidation_merges_with_existing_facts() {
    let harness = Harness::with_summarizer(ScriptedSummarizer::with_facts(&["works as a nurse"]));
    let history = vec!["User: I work night shifts at the hospital".to_string()];
    harness.memory.consolidate_session("alice_01", &history).await.unwrap();

    harness.summarizer.set_facts(&["works as a nurse", "has two cats"]);
    let stored = harness.memory.consolidate_session("alice_01", &history).await.unwrap();

    assert_eq!(stored, 2);
    assert_eq!(
        fact_texts(&harness, "alice_01").await,
        vec!["has two cats", "works as a nurse"]
    );
}

#[tokio::test]
async fn test_consolidation_leaves_other_users_alone() {
    let harness = Harness::with_summarizer(ScriptedSummarizer::with_facts(&["enjoys hiking"]));
    let history = vec!["User: I went hiking".to_string()];
    harness.memory.consolidate_session("bob", &history).await.unwrap();

    harness.summarizer.set_facts(&["plays chess"]);
    harness.memory.consolidate_session("alice_01", &history).await.unwrap();

    assert_eq!(fact_texts(&harness, "bob").await, vec!["enjoys hiking"]);
    assert_eq!(fact_texts(&harness, "alice_01").await, vec!["plays chess"]);
}

#[tokio::test]
async fn test_empty_history_is_a_noop() {
    let harness = Harness::with_summarizer(ScriptedSummarizer::with_facts(&["ignored"]));
    assert_eq!(harness.memory.consolidate_session("alice_01", &[]).await.unwrap(), 0);
    assert_eq!(harness.index.upserts(MEMORY_NS), 0);
    assert_eq!(harness.index.deletes(), 0);
}

#[tokio::test]
async fn test_reset_then_profile_is_default() {
    let harness = Harness::with_summarizer(ScriptedSummarizer::with_facts(&["likes tea"]));
    let profiles = harness.memory.profiles();

    profiles
        .update_profile(&UserProfile::new("alice_01").with_style_preference(StylePreference::Concise))
        .await
        .unwrap();
    harness
        .memory
        .consolidate_session("alice_01", &["User: I like tea".to_string()])
        .await
        .unwrap();
    harness
        .memory
        .process_realtime_interaction("alice_01", "Tell me about green tea varieties", "Sencha, matcha and gyokuro are common.")
        .await;
    harness
        .memory
        .add_memory("Bob owns a boat", MemoryType::Fact, MemoryAttributes::for_user("bob"))
        .await
        .unwrap();

    harness.memory.reset_memory("alice_01").await.unwrap();

    assert_eq!(harness.memory.get_profile("alice_01").await, UserProfile::new("alice_01"));
    assert_eq!(profiles.check_user_status("alice_01").await, UserStatus::New);
    assert_eq!(harness.memory.get_immediate_context("alice_01", 4), "");

    let remaining = harness.index.records(MEMORY_NS).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].metadata["user_id"], "bob");
}

#[tokio::test]
async fn test_clear_chat_history_keeps_facts_and_profile() {
    let harness = Harness::with_summarizer(ScriptedSummarizer::with_facts(&["speaks French"]));
    let profile = UserProfile::new("alice_01").with_risk_tolerance(RiskTolerance::High);
    harness.memory.profiles().update_profile(&profile).await.unwrap();
    harness
        .memory
        .consolidate_session("alice_01", &["User: je parle français".to_string()])
        .await
        .unwrap();
    let outcome = harness
        .memory
        .process_realtime_interaction(
            "alice_01",
            "What is the capital of Australia again?",
            "Canberra is the capital of Australia.",
        )
        .await;
    assert!(outcome.episode_id.is_some());

    harness.memory.clear_chat_history("alice_01").await.unwrap();

    let episodes = harness
        .memory
        .retrieve_relevant(
            &RecallQuery::new("capital of Australia", "alice_01")
                .with_type(MemoryType::Episodic)
                .with_threshold(0.0),
        )
        .await
        .unwrap();
    assert!(episodes.is_empty());
    assert_eq!(fact_texts(&harness, "alice_01").await, vec!["speaks French"]);
    assert_eq!(harness.memory.get_profile("alice_01").await, profile);
    assert_eq!(harness.memory.get_immediate_context("alice_01", 4), "");
}

#[tokio::test]
async fn test_retrieval_is_scoped_to_the_user() {
    let harness = Harness::new();
    let memory = &harness.memory;

    memory
        .add_memory("prefers Rust programming", MemoryType::Fact, MemoryAttributes::for_user("bob"))
        .await
        .unwrap();
    memory
        .add_memory("prefers Rust programming", MemoryType::Fact, MemoryAttributes::for_user("alice_01"))
        .await
        .unwrap();

    let found = memory
        .retrieve_relevant(&RecallQuery::new("prefers Rust programming", "alice_01").with_threshold(0.0))
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].item.user_id(), Some("alice_01"));

    let none = memory
        .retrieve_relevant(&RecallQuery::new("prefers Rust programming", "carol"))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_retrieval_respects_score_threshold() {
    let harness = Harness::new();
    let memory = &harness.memory;

    memory
        .add_memory("prefers Rust programming", MemoryType::Fact, MemoryAttributes::for_user("alice_01"))
        .await
        .unwrap();
    memory
        .add_memory("weather in Paris today", MemoryType::Fact, MemoryAttributes::for_user("alice_01"))
        .await
        .unwrap();

    let found = memory
        .retrieve_relevant(&RecallQuery::new("Rust programming", "alice_01"))
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].item.content, "prefers Rust programming");
    assert!(found[0].score >= 0.70);

    assert!(memory
        .retrieve_relevant(&RecallQuery::new("", "alice_01"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_short_term_buffer_is_bounded() {
    let harness = Harness::new();
    for i in 0..15 {
        harness
            .memory
            .process_realtime_interaction("alice_01", &format!("q{}", i), &format!("a{}", i))
            .await;
    }

    assert_eq!(harness.memory.short_term().len("alice_01"), 20);
    assert_eq!(
        harness.memory.get_immediate_context("alice_01", 4),
        "User: q13\nAgent: a13\nUser: q14\nAgent: a14"
    );
    // Short exchanges are not archived.
    assert_eq!(harness.index.upserts(MEMORY_NS), 0);
}

#[tokio::test]
async fn test_user_scoped_memory_without_user_is_rejected() {
    let harness = Harness::new();

    for memory_type in [MemoryType::Fact, MemoryType::Episodic] {
        let err = harness
            .memory
            .add_memory("orphaned memory", memory_type, MemoryAttributes::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryError::MissingUserId(t) if t == memory_type));
    }
    assert_eq!(harness.index.upserts(MEMORY_NS), 0);

    harness
        .memory
        .add_memory("Water boils at 100 C at sea level", MemoryType::Knowledge, MemoryAttributes::default())
        .await
        .unwrap();
    assert_eq!(harness.index.upserts(MEMORY_NS), 1);
}

#[tokio::test]
async fn test_profile_sync_write_counts() {
    let harness = Harness::new();
    let profiles = harness.memory.profiles();
    let base = UserProfile::new("alice_01");

    assert!(!profiles.sync_if_changed(&base, &base).await.unwrap());
    assert_eq!(harness.index.upserts(PROFILE_NS), 0);

    let changed = base.clone().with_style_preference(StylePreference::Concise);
    assert!(profiles.sync_if_changed(&base, &changed).await.unwrap());
    assert_eq!(harness.index.upserts(PROFILE_NS), 1);
}

#[tokio::test]
async fn test_interaction_updates_profile_and_archives() {
    let harness = Harness::new();

    let outcome = harness
        .memory
        .process_realtime_interaction(
            "alice_01",
            "Please be concise from now on, and keep it technical.",
            "Understood. Short, technical answers from here.",
        )
        .await;

    assert!(outcome.is_clean());
    assert!(outcome.profile_updated);
    assert!(outcome.episode_id.is_some());

    let profile = harness.memory.get_profile("alice_01").await;
    assert_eq!(profile.style_preference, StylePreference::Concise);
    assert_eq!(profile.explanation_depth, ragmind_core::ExplanationDepth::Technical);

    let archived = harness.index.records(MEMORY_NS).await;
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].metadata["type"], "episodic");
    assert_eq!(archived[0].metadata["user_id"], "alice_01");
    assert!(archived[0].metadata["text"]
        .as_str()
        .unwrap()
        .starts_with("User: Please be concise"));
}

#[tokio::test]
async fn test_pre_planning_check_uses_query_only() {
    let harness = Harness::new();

    assert!(!harness
        .memory
        .check_and_update_profile_pre_planning("alice_01", "")
        .await
        .unwrap());
    assert!(harness
        .memory
        .check_and_update_profile_pre_planning("alice_01", "Make answers shorter")
        .await
        .unwrap());
    assert!(!harness
        .memory
        .check_and_update_profile_pre_planning("alice_01", "Make answers shorter")
        .await
        .unwrap());
    assert_eq!(harness.index.upserts(PROFILE_NS), 1);
}
