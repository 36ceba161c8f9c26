//! Memory orchestration.
//!
//! [`MemoryManager`] ties the short-term buffer, the long-term memory
//! namespace, the profile store and the semantic cache together. Every
//! long-term read and write is scoped by user id: retrieval always filters on
//! `user_id`, and user-scoped memory kinds are rejected without one.

use crate::cache::SemanticCache;
use crate::context::ShortTermContext;
use crate::embeddings::EmbeddingProvider;
use crate::error::MemoryError;
use crate::index::{DeleteSelector, MetadataFilter, VectorIndex, VectorRecord};
use crate::profile::ProfileStore;
use crate::record::{StoredMemory, TYPE_FIELD, USER_ID_FIELD};
use crate::summarizer::Summarizer;
use crate::Result;
use chrono::Utc;
use ragmind_core::config::MemoryConfig;
use ragmind_core::{id, Config, MemoryAttributes, MemoryItem, MemoryType, ScoredMemory, UserProfile};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Agent message used when checking a query before it is answered.
pub const PRE_RESPONSE_SENTINEL: &str = "[SYSTEM: PRE-RESPONSE CHECK]";

/// Query used to pull a user's existing facts during consolidation.
const FACT_RECALL_QUERY: &str = "general user facts";

/// A post-turn processing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionStep {
    ProfileSync,
    Archive,
}

impl fmt::Display for InteractionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfileSync => f.write_str("profile sync"),
            Self::Archive => f.write_str("archive"),
        }
    }
}

/// What post-turn processing did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionOutcome {
    /// The stored profile was rewritten.
    pub profile_updated: bool,
    /// Id of the archived episode, if the exchange was archived.
    pub episode_id: Option<String>,
    /// Steps that failed and were skipped.
    pub failed_steps: Vec<InteractionStep>,
}

impl InteractionOutcome {
    /// True if every attempted step succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed_steps.is_empty()
    }
}

/// Parameters for relevance retrieval. Unset fields use configured defaults.
#[derive(Debug, Clone)]
pub struct RecallQuery {
    pub query: String,
    pub user_id: String,
    pub limit: Option<usize>,
    pub memory_type: Option<MemoryType>,
    pub score_threshold: Option<f32>,
}

impl RecallQuery {
    pub fn new(query: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: user_id.into(),
            limit: None,
            memory_type: None,
            score_threshold: None,
        }
    }

    /// Set the maximum number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Restrict to one memory kind.
    pub fn with_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = Some(memory_type);
        self
    }

    /// Set the minimum similarity.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    /// Keep every match regardless of score, including negative similarity.
    pub fn unfiltered(mut self) -> Self {
        self.score_threshold = Some(f32::NEG_INFINITY);
        self
    }
}

/// Per-user memory over a vector index.
pub struct MemoryManager {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    summarizer: Arc<dyn Summarizer>,
    profiles: ProfileStore,
    context: ShortTermContext,
    cache: SemanticCache,
    namespace: String,
    settings: MemoryConfig,
}

impl MemoryManager {
    /// Build a manager from its collaborators and the loaded configuration.
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        summarizer: Arc<dyn Summarizer>,
        config: &Config,
    ) -> Self {
        let settings = config.memory.clone();
        Self {
            profiles: ProfileStore::new(
                index.clone(),
                config.index.profile_namespace.clone(),
                config.embeddings.dimension,
            ),
            context: ShortTermContext::new(settings.short_term_limit),
            cache: SemanticCache::new(settings.cache_threshold, settings.cache_capacity),
            namespace: config.index.memory_namespace.clone(),
            index,
            embedder,
            summarizer,
            settings,
        }
    }

    /// The profile store.
    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// The semantic answer cache.
    pub fn cache(&self) -> &SemanticCache {
        &self.cache
    }

    /// The short-term buffer.
    pub fn short_term(&self) -> &ShortTermContext {
        &self.context
    }

    /// The embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Active memory settings.
    pub fn settings(&self) -> &MemoryConfig {
        &self.settings
    }

    /// The user's profile, or defaults.
    pub async fn get_profile(&self, user_id: &str) -> UserProfile {
        self.profiles.get_profile(user_id).await
    }

    /// The last `window_size` buffered turns as `User:` / `Agent:` lines.
    pub fn get_immediate_context(&self, user_id: &str, window_size: usize) -> String {
        self.context.render(user_id, window_size)
    }

    /// Record a completed exchange.
    ///
    /// Buffers both turns, syncs any detected profile change, and archives
    /// long exchanges as episodic memory. Each step runs on its own; failures
    /// are logged and listed in the outcome.
    pub async fn process_realtime_interaction(
        &self,
        user_id: &str,
        user_msg: &str,
        agent_msg: &str,
    ) -> InteractionOutcome {
        let mut outcome = InteractionOutcome::default();
        if user_msg.is_empty() || agent_msg.is_empty() {
            return outcome;
        }

        self.context.push_exchange(user_id, user_msg, agent_msg);

        match self.apply_profile_delta(user_id, user_msg, agent_msg).await {
            Ok(changed) => outcome.profile_updated = changed,
            Err(e) => {
                error!("Profile sync failed for {}: {}", user_id, e);
                outcome.failed_steps.push(InteractionStep::ProfileSync);
            }
        }

        if user_msg.chars().count() + agent_msg.chars().count() > self.settings.archive_min_chars {
            let content = format!("User: {}\nAgent: {}", user_msg, agent_msg);
            match self
                .add_memory(&content, MemoryType::Episodic, MemoryAttributes::for_user(user_id))
                .await
            {
                Ok(id) => outcome.episode_id = Some(id),
                Err(e) => {
                    error!("Archiving exchange failed for {}: {}", user_id, e);
                    outcome.failed_steps.push(InteractionStep::Archive);
                }
            }
        }

        outcome
    }

    /// Check an incoming query for preference changes before answering it.
    ///
    /// Returns whether the stored profile changed.
    pub async fn check_and_update_profile_pre_planning(&self, user_id: &str, user_query: &str) -> Result<bool> {
        if user_query.is_empty() {
            return Ok(false);
        }
        let changed = self
            .apply_profile_delta(user_id, user_query, PRE_RESPONSE_SENTINEL)
            .await?;
        if changed {
            info!("Profile updated by pre-planning check for {}", user_id);
        }
        Ok(changed)
    }

    async fn apply_profile_delta(&self, user_id: &str, user_msg: &str, agent_msg: &str) -> Result<bool> {
        // A backend failure must not be mistaken for "no profile", or the
        // stored profile would be overwritten with defaults.
        let current = self
            .profiles
            .try_get_profile(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id));

        let delta = self
            .summarizer
            .analyze_interaction_delta(&current, user_msg, agent_msg)
            .await?;
        if delta.is_empty() {
            return Ok(false);
        }

        let updated = current.apply(&delta);
        self.profiles.sync_if_changed(&current, &updated).await
    }

    fn new_item(&self, content: &str, memory_type: MemoryType, attributes: MemoryAttributes) -> Result<MemoryItem> {
        if content.trim().is_empty() {
            return Err(MemoryError::EmptyContent);
        }
        let has_owner = attributes.user_id.as_deref().is_some_and(|id| !id.is_empty());
        if memory_type.is_user_scoped() && !has_owner {
            error!("Refusing to store {} memory without a user_id", memory_type);
            return Err(MemoryError::MissingUserId(memory_type));
        }

        Ok(MemoryItem {
            id: id::uuid(),
            content: content.to_string(),
            memory_type,
            timestamp: Utc::now(),
            attributes,
        })
    }

    /// Embed and store one memory, returning its id.
    pub async fn add_memory(
        &self,
        content: &str,
        memory_type: MemoryType,
        attributes: MemoryAttributes,
    ) -> Result<String> {
        let item = self.new_item(content, memory_type, attributes)?;
        let vector = self.embedder.embed_one(&item.content).await?;

        let id = item.id.clone();
        let record = StoredMemory::new(item).to_record(vector)?;
        self.index.upsert(&self.namespace, vec![record]).await?;
        debug!("Stored {} memory {}", memory_type, id);
        Ok(id)
    }

    /// Memories of one user most similar to a query, best first.
    ///
    /// Matches below the score threshold are dropped. Records that cannot be
    /// decoded are skipped.
    pub async fn retrieve_relevant(&self, recall: &RecallQuery) -> Result<Vec<ScoredMemory>> {
        if recall.query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = recall.limit.unwrap_or(self.settings.retrieval_limit);
        let threshold = recall.score_threshold.unwrap_or(self.settings.score_threshold);

        let vector = self.embedder.embed_one(&recall.query).await?;
        let mut filter = MetadataFilter::new().eq(USER_ID_FIELD, recall.user_id.as_str());
        if let Some(memory_type) = recall.memory_type {
            filter = filter.eq(TYPE_FIELD, memory_type.as_str());
        }

        let matches = self.index.query(&self.namespace, &vector, limit, &filter).await?;

        let mut memories = Vec::with_capacity(matches.len());
        for found in matches {
            if found.score < threshold {
                continue;
            }
            match StoredMemory::from_metadata(&found.id, &found.metadata) {
                Ok(stored) => memories.push(ScoredMemory {
                    item: stored.item,
                    score: found.score,
                }),
                Err(e) => warn!("Skipping memory: {}", e),
            }
        }

        debug!("Retrieved {} memories for {}", memories.len(), recall.user_id);
        Ok(memories)
    }

    /// Distill a finished session into the user's fact set.
    ///
    /// Existing facts are merged with the session's facts, then the user's
    /// facts are replaced wholesale. Returns the number of facts stored.
    pub async fn consolidate_session(&self, user_id: &str, history: &[String]) -> Result<usize> {
        if history.is_empty() {
            return Ok(0);
        }

        let summary = self.summarizer.summarize(history).await?;
        if summary.key_facts.is_empty() {
            debug!("No facts extracted for {}", user_id);
            return Ok(0);
        }

        let recall = RecallQuery::new(FACT_RECALL_QUERY, user_id)
            .with_limit(self.settings.consolidation_fetch_limit)
            .with_type(MemoryType::Fact)
            .unfiltered();
        let existing: Vec<String> = self
            .retrieve_relevant(&recall)
            .await?
            .into_iter()
            .map(|m| m.item.content)
            .collect();

        let mut seen = HashSet::new();
        let mut facts: Vec<String> = self
            .summarizer
            .deduplicate_facts(&existing, &summary.key_facts)
            .await?
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty() && seen.insert(f.clone()))
            .collect();

        if facts.is_empty() {
            return Err(MemoryError::summarizer("deduplication returned no facts"));
        }
        if facts.len() > self.settings.max_facts {
            warn!(
                "Keeping {} of {} facts for {}",
                self.settings.max_facts,
                facts.len(),
                user_id
            );
            facts.truncate(self.settings.max_facts);
        }

        // Embed before deleting so a provider failure leaves the old facts.
        let records = self.fact_records(user_id, &facts).await?;

        let old_facts = self
            .user_filter(user_id)
            .eq(TYPE_FIELD, MemoryType::Fact.as_str());
        self.index
            .delete(&self.namespace, DeleteSelector::Filter(old_facts))
            .await?;
        self.index.upsert(&self.namespace, records).await?;

        info!("Consolidated facts for {}. Final count: {}", user_id, facts.len());
        Ok(facts.len())
    }

    async fn fact_records(&self, user_id: &str, facts: &[String]) -> Result<Vec<VectorRecord>> {
        let vectors = self.embedder.embed(facts).await?;
        if vectors.len() != facts.len() || vectors.iter().any(Vec::is_empty) {
            return Err(MemoryError::Embedding(format!(
                "Expected {} embeddings, got {}",
                facts.len(),
                vectors.len()
            )));
        }

        facts
            .iter()
            .zip(vectors)
            .map(|(fact, vector)| {
                let item = self.new_item(fact, MemoryType::Fact, MemoryAttributes::for_user(user_id))?;
                StoredMemory::new(item).to_record(vector)
            })
            .collect()
    }

    fn user_filter(&self, user_id: &str) -> MetadataFilter {
        MetadataFilter::new().eq(USER_ID_FIELD, user_id)
    }

    /// Forget the conversation: the short-term buffer and archived episodes.
    /// Facts and the profile survive.
    pub async fn clear_chat_history(&self, user_id: &str) -> Result<()> {
        self.context.clear(user_id);
        let filter = self
            .user_filter(user_id)
            .eq(TYPE_FIELD, MemoryType::Episodic.as_str());
        self.index
            .delete(&self.namespace, DeleteSelector::Filter(filter))
            .await?;
        info!("Cleared chat history for {}", user_id);
        Ok(())
    }

    /// Erase everything stored about a user.
    ///
    /// Every step runs even if an earlier one fails; the error lists the
    /// persisted deletions that did not go through.
    pub async fn reset_memory(&self, user_id: &str) -> Result<()> {
        self.context.clear(user_id);
        self.cache.clear_user(user_id);

        let mut failures = Vec::new();

        match self
            .index
            .delete(&self.namespace, DeleteSelector::Filter(self.user_filter(user_id)))
            .await
        {
            Ok(()) => warn!("Full memory reset performed for {}", user_id),
            Err(e) => {
                error!("Failed to reset memory vectors for {}: {}", user_id, e);
                failures.push(format!("memory vectors: {}", e));
            }
        }

        if let Err(e) = self.profiles.delete_profile(user_id).await {
            error!("Failed to delete profile for {}: {}", user_id, e);
            failures.push(format!("profile: {}", e));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(MemoryError::PartialReset {
                user_id: user_id.to_string(),
                failures: failures.join("; "),
            })
        }
    }
}
