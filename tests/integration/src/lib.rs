//! Shared fixtures for the integration tests.
//!
//! Everything here is deterministic: no network and no model calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use ragmind_core::{Config, ExplanationDepth, ProfileDelta, StylePreference, UserProfile};
use ragmind_memory::{
    ChatSummary, DeleteSelector, EmbeddingProvider, InMemoryIndex, MemoryManager, MetadataFilter,
    QueryMatch, Summarizer, VectorIndex, VectorRecord,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Embedding dimension used by [`KeywordEmbedder`].
pub const DIM: usize = 64;

/// Hashes each lowercase word into one of [`DIM`] buckets.
///
/// Texts sharing words land close together; texts with no words in common are
/// orthogonal.
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; DIM];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3));
            vector[(hash % DIM as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, texts: &[String]) -> ragmind_memory::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Rule-based stand-in for the model-backed summarizer.
///
/// Deltas come from keywords in the user message; summaries return the
/// configured facts; deduplication is an order-preserving union.
#[derive(Default)]
pub struct ScriptedSummarizer {
    facts: Mutex<Vec<String>>,
}

impl ScriptedSummarizer {
    pub fn with_facts(facts: &[&str]) -> Self {
        Self {
            facts: Mutex::new(facts.iter().map(|f| f.to_string()).collect()),
        }
    }

    /// Replace the facts the next summary returns.
    pub fn set_facts(&self, facts: &[&str]) {
        *self.facts.lock() = facts.iter().map(|f| f.to_string()).collect();
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn analyze_interaction_delta(
        &self,
        _current: &UserProfile,
        user_msg: &str,
        _agent_msg: &str,
    ) -> ragmind_memory::Result<ProfileDelta> {
        let msg = user_msg.to_lowercase();
        let mut delta = ProfileDelta::default();
        if msg.contains("be concise") || msg.contains("shorter") {
            delta.style_preference = Some(StylePreference::Concise);
        }
        if msg.contains("technical") {
            delta.explanation_depth = Some(ExplanationDepth::Technical);
        }
        Ok(delta)
    }

    async fn summarize(&self, _history: &[String]) -> ragmind_memory::Result<ChatSummary> {
        Ok(ChatSummary {
            key_facts: self.facts.lock().clone(),
        })
    }

    async fn deduplicate_facts(
        &self,
        existing: &[String],
        candidates: &[String],
    ) -> ragmind_memory::Result<Vec<String>> {
        let mut merged: Vec<String> = Vec::new();
        for fact in existing.iter().chain(candidates) {
            if !merged.contains(fact) {
                merged.push(fact.clone());
            }
        }
        Ok(merged)
    }
}

/// An in-memory index that counts writes per namespace.
#[derive(Default)]
pub struct CountingIndex {
    inner: InMemoryIndex,
    upserts: Mutex<HashMap<String, usize>>,
    deletes: AtomicUsize,
}

impl CountingIndex {
    /// Upsert calls made against `namespace`.
    pub fn upserts(&self, namespace: &str) -> usize {
        self.upserts.lock().get(namespace).copied().unwrap_or(0)
    }

    /// Delete calls made against any namespace.
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Records currently stored in `namespace`.
    pub async fn records(&self, namespace: &str) -> Vec<VectorRecord> {
        self.inner.records(namespace).await
    }
}

#[async_trait]
impl VectorIndex for CountingIndex {
    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> ragmind_memory::Result<()> {
        *self.upserts.lock().entry(namespace.to_string()).or_default() += 1;
        self.inner.upsert(namespace, records).await
    }

    async fn fetch(
        &self,
        namespace: &str,
        ids: &[String],
    ) -> ragmind_memory::Result<HashMap<String, VectorRecord>> {
        self.inner.fetch(namespace, ids).await
    }

    async fn delete(&self, namespace: &str, selector: DeleteSelector) -> ragmind_memory::Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(namespace, selector).await
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: &MetadataFilter,
    ) -> ragmind_memory::Result<Vec<QueryMatch>> {
        self.inner.query(namespace, vector, top_k, filter).await
    }
}

/// Configuration sized for [`KeywordEmbedder`] over an in-memory index.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.index.provider = ragmind_core::config::IndexProvider::Memory;
    config.embeddings.dimension = DIM;
    config
}

/// A manager plus handles to its index and summarizer.
pub struct Harness {
    pub index: Arc<CountingIndex>,
    pub summarizer: Arc<ScriptedSummarizer>,
    pub memory: Arc<MemoryManager>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_summarizer(ScriptedSummarizer::default())
    }

    pub fn with_summarizer(summarizer: ScriptedSummarizer) -> Self {
        let index = Arc::new(CountingIndex::default());
        let summarizer = Arc::new(summarizer);
        let memory = Arc::new(MemoryManager::new(
            index.clone(),
            Arc::new(KeywordEmbedder),
            summarizer.clone(),
            &test_config(),
        ));
        Self {
            index,
            summarizer,
            memory,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
