//! Namespaced vector index access.
//!
//! [`VectorIndex`] is the seam to the vector database. Every operation is
//! scoped to a namespace; filters are conjunctions of equality predicates on
//! top-level metadata fields.

mod local;
mod pinecone;

pub use local::{FileIndex, InMemoryIndex};
pub use pinecone::PineconeIndex;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Metadata stored alongside a vector.
pub type Metadata = Map<String, Value>;

/// A stored vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl VectorRecord {
    /// Create a new record.
    pub fn new(id: impl Into<String>, values: Vec<f32>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            values,
            metadata,
        }
    }
}

/// A nearest-neighbour match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Equality filter over metadata fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    clauses: BTreeMap<String, Value>,
}

impl MetadataFilter {
    /// An empty filter, matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.insert(field.into(), value.into());
        self
    }

    /// True if the filter has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Check whether metadata satisfies every clause.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| metadata.get(field) == Some(value))
    }

    /// Iterate over `(field, value)` clauses.
    pub fn clauses(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.clauses.iter()
    }
}

/// Which records a delete removes.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteSelector {
    /// Point delete by id.
    Ids(Vec<String>),
    /// Every record matching the filter.
    Filter(MetadataFilter),
}

/// Trait for vector indexes.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace records.
    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> Result<()>;

    /// Fetch records by id. Missing ids are absent from the result.
    async fn fetch(&self, namespace: &str, ids: &[String]) -> Result<HashMap<String, VectorRecord>>;

    /// Delete records. Deleting nothing is not an error.
    async fn delete(&self, namespace: &str, selector: DeleteSelector) -> Result<()>;

    /// Nearest-neighbour search restricted to records matching `filter`,
    /// best match first.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<QueryMatch>>;
}
