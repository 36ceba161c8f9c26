//! Long-term memory and user profiles for ragmind.
//!
//! This crate provides:
//! - Embedding generation via OpenAI-compatible APIs
//! - Namespaced vector indexes (in-memory, file-backed, Pinecone)
//! - Profile persistence, short-term context and the semantic cache
//! - [`MemoryManager`], which scopes all of it by user id

pub mod cache;
pub mod context;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod manager;
pub mod profile;
pub mod record;
pub mod summarizer;

pub use cache::{CacheHit, SemanticCache};
pub use context::ShortTermContext;
pub use embeddings::{cosine_similarity, EmbeddingProvider, OpenAIEmbeddings};
pub use error::MemoryError;
pub use index::{
    DeleteSelector, FileIndex, InMemoryIndex, Metadata, MetadataFilter, PineconeIndex, QueryMatch,
    VectorIndex, VectorRecord,
};
pub use manager::{InteractionOutcome, InteractionStep, MemoryManager, RecallQuery, PRE_RESPONSE_SENTINEL};
pub use profile::ProfileStore;
pub use record::{ProfileRecord, StoredMemory};
pub use summarizer::{ChatSummary, Summarizer};

/// Result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
