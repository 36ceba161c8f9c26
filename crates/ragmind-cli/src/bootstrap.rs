//! Construction of the runtime components from configuration.

use anyhow::{bail, Context};
use ragmind_agent::{ChatAgent, LlmSummarizer, RuntimeConfig};
use ragmind_core::config::IndexProvider;
use ragmind_core::env::vars;
use ragmind_core::{paths, Config, SecretString};
use ragmind_memory::{
    EmbeddingProvider, FileIndex, InMemoryIndex, MemoryManager, OpenAIEmbeddings, PineconeIndex,
    VectorIndex,
};
use ragmind_providers::{OpenAIProvider, Provider};
use std::sync::Arc;
use tracing::{debug, info};

/// Everything a command needs, built once at process start.
pub struct Components {
    pub config: Config,
    pub memory: Arc<MemoryManager>,
    pub agent: ChatAgent,
}

impl Components {
    /// Build the index, embedder, chat provider, memory manager, and agent.
    pub fn build(config: Config) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;

        let index = build_index(&config)?;
        let embedder = build_embedder(&config)?;
        let provider = build_provider(&config)?;
        let runtime = RuntimeConfig::from_llm(&config.llm)?;

        let summarizer = Arc::new(LlmSummarizer::new(provider.clone(), runtime.model.clone()));
        let memory = Arc::new(MemoryManager::new(index, embedder, summarizer, &config));
        let agent = ChatAgent::new(memory.clone(), provider).with_config(runtime);

        info!("Components ready (model {})", config.llm.model);
        Ok(Self {
            config,
            memory,
            agent,
        })
    }
}

/// Open the configured vector index.
pub fn build_index(config: &Config) -> anyhow::Result<Arc<dyn VectorIndex>> {
    let index: Arc<dyn VectorIndex> = match config.index.provider {
        IndexProvider::Memory => {
            debug!("Using in-memory index");
            Arc::new(InMemoryIndex::new())
        }
        IndexProvider::File => {
            let path = match &config.index.path {
                Some(path) => path.clone(),
                None => paths::index_file()?,
            };
            debug!("Using file index at {}", path.display());
            Arc::new(
                FileIndex::new(path.clone())
                    .with_context(|| format!("failed to open index file {}", path.display()))?,
            )
        }
        IndexProvider::Pinecone => {
            let Some(host) = config.index.host.as_deref() else {
                bail!("index.host is required for the pinecone provider");
            };
            let api_key = SecretString::from_env(vars::PINECONE_API_KEY)?;
            debug!("Using Pinecone index at {}", host);
            Arc::new(PineconeIndex::new(host, api_key)?)
        }
    };
    Ok(index)
}

/// Create the embedding client.
pub fn build_embedder(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let api_key = SecretString::from_env(vars::OPENAI_API_KEY)?;
    let mut embedder = OpenAIEmbeddings::new(api_key)?
        .with_model(config.embeddings.model.clone())
        .with_dimension(config.embeddings.dimension);
    if let Some(url) = &config.embeddings.base_url {
        embedder = embedder.with_base_url(url.clone());
    }
    Ok(Arc::new(embedder))
}

/// Create the chat provider named by `llm.model`.
///
/// Any provider prefix is accepted when `llm.base_url` points at an
/// OpenAI-compatible endpoint.
pub fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn Provider>> {
    let Some((provider, _)) = config.llm.provider_and_model() else {
        bail!("llm.model '{}' must be in provider/model form", config.llm.model);
    };

    match (provider, &config.llm.base_url) {
        (_, Some(url)) => Ok(Arc::new(OpenAIProvider::from_env()?.with_base_url(url.clone()))),
        ("openai", None) => Ok(Arc::new(OpenAIProvider::from_env()?)),
        (other, None) => bail!(
            "unsupported provider '{}'; set llm.base_url for an OpenAI-compatible endpoint",
            other
        ),
    }
}
