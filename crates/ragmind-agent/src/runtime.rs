//! Agent runtime for answering user turns.

use crate::error::AgentError;
use crate::prompt::{build_system_prompt, PromptContext};
use crate::Result;
use ragmind_core::config::LlmConfig;
use ragmind_core::{MemoryType, ScoredMemory};
use ragmind_memory::{InteractionOutcome, MemoryManager, RecallQuery};
use ragmind_providers::{ChatOptions, Message, Provider};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for the agent runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Model id passed to the provider.
    pub model: String,

    /// Maximum output tokens.
    pub max_output_tokens: usize,

    /// Temperature for generation.
    pub temperature: f32,

    /// Facts retrieved per turn.
    pub fact_limit: usize,

    /// Past episodes retrieved per turn.
    pub episode_limit: usize,

    /// Reuse cached answers for near-identical queries.
    pub use_cache: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_output_tokens: 1024,
            temperature: 0.7,
            fact_limit: 5,
            episode_limit: 3,
            use_cache: true,
        }
    }
}

impl RuntimeConfig {
    /// Runtime settings for a configured model.
    pub fn from_llm(llm: &LlmConfig) -> Result<Self> {
        let (_, model) = llm
            .provider_and_model()
            .ok_or_else(|| AgentError::config(format!("model '{}' is not in provider/model form", llm.model)))?;
        Ok(Self {
            model: model.to_string(),
            max_output_tokens: llm.max_tokens,
            temperature: llm.temperature,
            ..Self::default()
        })
    }
}

/// An answered turn.
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Answer text.
    pub content: String,

    /// The answer came from the semantic cache.
    pub from_cache: bool,

    /// Post-turn memory processing.
    pub interaction: InteractionOutcome,
}

/// Answers user turns using long-term memory.
pub struct ChatAgent {
    memory: Arc<MemoryManager>,
    provider: Arc<dyn Provider>,
    config: RuntimeConfig,
}

impl ChatAgent {
    /// Create a new agent.
    pub fn new(memory: Arc<MemoryManager>, provider: Arc<dyn Provider>) -> Self {
        Self {
            memory,
            provider,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the runtime configuration.
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// The memory manager behind this agent.
    pub fn memory(&self) -> &Arc<MemoryManager> {
        &self.memory
    }

    /// The runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    async fn recall(&self, user_id: &str, query: &str, memory_type: MemoryType, limit: usize) -> Vec<ScoredMemory> {
        let recall = RecallQuery::new(query, user_id)
            .with_type(memory_type)
            .with_limit(limit);
        match self.memory.retrieve_relevant(&recall).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Retrieving {} memories failed for {}: {}", memory_type, user_id, e);
                Vec::new()
            }
        }
    }

    /// Answer one user turn.
    ///
    /// Memory failures degrade the answer instead of failing it; only a
    /// provider failure is returned.
    pub async fn generate_response(&self, user_id: &str, query: &str) -> Result<AgentReply> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AgentError::invalid_input("query is empty"));
        }

        match self
            .memory
            .check_and_update_profile_pre_planning(user_id, query)
            .await
        {
            // Cached answers were written for the old preferences.
            Ok(true) => self.memory.cache().clear_user(user_id),
            Ok(false) => {}
            Err(e) => warn!("Pre-planning profile check failed for {}: {}", user_id, e),
        }

        let profile = self.memory.get_profile(user_id).await;

        let query_embedding = if self.config.use_cache {
            match self.memory.embedder().embed_one(query).await {
                Ok(embedding) => Some(embedding),
                Err(e) => {
                    warn!("Skipping semantic cache: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let cached = query_embedding
            .as_deref()
            .and_then(|embedding| self.memory.cache().lookup(user_id, embedding));

        let (content, from_cache) = match cached {
            Some(hit) => {
                info!("Answering {} from cache ({:.3})", user_id, hit.similarity);
                (hit.response, true)
            }
            None => {
                let facts = self.recall(user_id, query, MemoryType::Fact, self.config.fact_limit).await;
                let episodes = self
                    .recall(user_id, query, MemoryType::Episodic, self.config.episode_limit)
                    .await;
                let recent = self
                    .memory
                    .get_immediate_context(user_id, self.memory.settings().context_window);

                let system = build_system_prompt(&PromptContext {
                    profile: &profile,
                    facts: &facts,
                    episodes: &episodes,
                    recent: &recent,
                });
                debug!(
                    "Prompting {} with {} facts and {} episodes",
                    self.config.model,
                    facts.len(),
                    episodes.len()
                );

                let options = ChatOptions::with_max_tokens(self.config.max_output_tokens)
                    .temperature(self.config.temperature)
                    .user(user_id);
                let response = self
                    .provider
                    .chat(&self.config.model, &[Message::system(system), Message::user(query)], Some(options))
                    .await?;

                if let Some(embedding) = query_embedding {
                    self.memory.cache().insert(user_id, embedding, query, response.content.clone());
                }
                (response.content, false)
            }
        };

        let interaction = self
            .memory
            .process_realtime_interaction(user_id, query, &content)
            .await;
        if !interaction.is_clean() {
            warn!("Post-turn processing incomplete for {}: {:?}", user_id, interaction.failed_steps);
        }

        Ok(AgentReply {
            content,
            from_cache,
            interaction,
        })
    }
}
