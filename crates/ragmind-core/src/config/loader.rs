//! Configuration loading and persistence.

use super::{Config, IndexProvider};
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to the default path.
    pub fn save_default(&self) -> Result<(), ConfigError> {
        let path = paths::config_file()?;
        self.save(&path)
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Index backend
        if self.index.provider == IndexProvider::Pinecone && self.index.host.is_none() {
            errors.push("Index provider is 'pinecone' but no host is set".to_string());
        }
        if self.index.memory_namespace.is_empty() || self.index.profile_namespace.is_empty() {
            errors.push("Index namespaces must not be empty".to_string());
        }
        if self.index.memory_namespace == self.index.profile_namespace {
            errors.push(format!(
                "Memory and profile namespaces must differ, both are '{}'",
                self.index.memory_namespace
            ));
        }

        // 2. Embeddings
        if self.embeddings.dimension == 0 {
            errors.push("Embedding dimension must be greater than 0".to_string());
        }

        // 3. Chat model format (provider/model-id)
        if self.llm.provider_and_model().is_none() {
            errors.push(format!(
                "Invalid model format '{}', expected 'provider/model-id'",
                self.llm.model
            ));
        }

        // 4. Memory limits
        let memory = &self.memory;
        if memory.short_term_limit < 2 {
            errors.push(format!(
                "Memory short_term_limit must hold at least one exchange, got {}",
                memory.short_term_limit
            ));
        }
        if memory.context_window > memory.short_term_limit {
            errors.push(format!(
                "Memory context_window ({}) exceeds short_term_limit ({})",
                memory.context_window, memory.short_term_limit
            ));
        }
        if memory.retrieval_limit == 0 || memory.retrieval_limit > 100 {
            errors.push(format!(
                "Memory retrieval_limit must be 1-100, got {}",
                memory.retrieval_limit
            ));
        }
        if !(0.0..=1.0).contains(&memory.score_threshold) {
            errors.push(format!(
                "Memory score_threshold must be 0.0-1.0, got {}",
                memory.score_threshold
            ));
        }
        if memory.consolidation_fetch_limit == 0 {
            errors.push("Memory consolidation_fetch_limit must be greater than 0".to_string());
        }
        if memory.max_facts == 0 {
            errors.push("Memory max_facts must be greater than 0".to_string());
        }
        // Consolidation rewrites the whole fact set from what it re-reads.
        if memory.max_facts > memory.consolidation_fetch_limit {
            errors.push(format!(
                "Memory max_facts ({}) exceeds consolidation_fetch_limit ({})",
                memory.max_facts, memory.consolidation_fetch_limit
            ));
        }
        if memory.cache_threshold <= 0.0 || memory.cache_threshold > 1.0 {
            errors.push(format!(
                "Memory cache_threshold must be in (0.0, 1.0], got {}",
                memory.cache_threshold
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Load configuration from the default path, falling back to defaults if no file exists.
    pub fn load_or_default() -> Self {
        match Self::load_default() {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Self::from_env_defaults(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable config file: {}", e);
                Self::from_env_defaults()
            }
        }
    }

    /// Create a Config from defaults, enhanced by environment variable detection.
    ///
    /// `PINECONE_HOST` switches the index to Pinecone; `RAGMIND_INDEX_PATH`
    /// overrides the file backend location.
    pub fn from_env_defaults() -> Self {
        let mut config = Self::default();

        if let Some(host) = env::get_var(env::vars::PINECONE_HOST) {
            config.index.provider = IndexProvider::Pinecone;
            config.index.host = Some(host);
        } else if let Some(path) = env::get_var(env::vars::RAGMIND_INDEX_PATH) {
            config.index.path = Some(paths::expand_tilde(&path));
        }

        if let Some(model) = env::get_var(env::vars::RAGMIND_MODEL) {
            config.llm.model = model;
        }

        config
    }
}

/// Configuration builder for creating configs programmatically.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index backend.
    pub fn index_provider(mut self, provider: IndexProvider) -> Self {
        self.config.index.provider = provider;
        self
    }

    /// Set the index host.
    pub fn index_host(mut self, host: impl Into<String>) -> Self {
        self.config.index.host = Some(host.into());
        self
    }

    /// Set the chat model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.llm.model = model.into();
        self
    }

    /// Set the embedding dimension.
    pub fn dimension(mut self, dimension: usize) -> Self {
        self.config.embeddings.dimension = dimension;
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: super::LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Build the config.
    pub fn build(self) -> Config {
        self.config
    }

    /// Validate and build the config, returning an error if validation fails.
    pub fn build_validated(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
