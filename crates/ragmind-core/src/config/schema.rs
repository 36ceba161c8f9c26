//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main ragmind configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Vector index backend.
    #[serde(default)]
    pub index: IndexConfig,

    /// Embeddings settings.
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    /// Chat model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Memory manager tuning.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Vector index backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexProvider {
    /// Process-local, lost on exit.
    Memory,
    /// JSON file on local disk.
    #[default]
    File,
    /// Hosted Pinecone index.
    Pinecone,
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Backend to use.
    #[serde(default)]
    pub provider: IndexProvider,

    /// Index host URL (Pinecone data plane).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Storage file for the file backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Namespace holding facts and episodes.
    #[serde(default = "default_memory_namespace")]
    pub memory_namespace: String,

    /// Namespace holding user profiles.
    #[serde(default = "default_profile_namespace")]
    pub profile_namespace: String,
}

fn default_memory_namespace() -> String {
    "memory_store".to_string()
}

fn default_profile_namespace() -> String {
    "user_profiles".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            provider: IndexProvider::default(),
            host: None,
            path: None,
            memory_namespace: default_memory_namespace(),
            profile_namespace: default_profile_namespace(),
        }
    }
}

/// Embeddings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Embedding model.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension, also used for profile placeholder vectors.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// API base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimension() -> usize {
    1536
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_dimension(),
            base_url: None,
        }
    }
}

/// Chat model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model in `provider/model-id` form.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Sampling temperature for answers.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens per answer.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_llm_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> usize {
    1024
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmConfig {
    /// Split the model into `(provider, model-id)`.
    pub fn provider_and_model(&self) -> Option<(&str, &str)> {
        self.model.split_once('/')
    }
}

/// Memory manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Short-term turns kept per user.
    pub short_term_limit: usize,

    /// Turns rendered into the immediate context.
    pub context_window: usize,

    /// Combined exchange length above which an exchange is archived.
    pub archive_min_chars: usize,

    /// Results returned by relevance retrieval.
    pub retrieval_limit: usize,

    /// Minimum similarity for retrieved memories.
    pub score_threshold: f32,

    /// Existing facts considered during consolidation.
    pub consolidation_fetch_limit: usize,

    /// Upper bound on stored facts per user after consolidation.
    pub max_facts: usize,

    /// Minimum similarity for a semantic cache hit.
    pub cache_threshold: f32,

    /// Cached answers kept per user.
    pub cache_capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_limit: 20,
            context_window: 4,
            archive_min_chars: 50,
            retrieval_limit: 5,
            score_threshold: 0.70,
            consolidation_fetch_limit: 50,
            max_facts: 25,
            cache_threshold: 0.95,
            cache_capacity: 64,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    /// Get the level as an `EnvFilter` directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
