//! Process-local vector indexes.

use super::{DeleteSelector, MetadataFilter, QueryMatch, VectorIndex, VectorRecord};
use crate::embeddings::cosine_similarity;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;

type Namespace = HashMap<String, VectorRecord>;
type Namespaces = HashMap<String, Namespace>;

fn fetch_from(namespaces: &Namespaces, namespace: &str, ids: &[String]) -> HashMap<String, VectorRecord> {
    let Some(records) = namespaces.get(namespace) else {
        return HashMap::new();
    };
    ids.iter()
        .filter_map(|id| records.get(id).map(|r| (id.clone(), r.clone())))
        .collect()
}

fn delete_from(namespaces: &mut Namespaces, namespace: &str, selector: &DeleteSelector) -> usize {
    let Some(records) = namespaces.get_mut(namespace) else {
        return 0;
    };
    let before = records.len();
    match selector {
        DeleteSelector::Ids(ids) => {
            for id in ids {
                records.remove(id);
            }
        }
        DeleteSelector::Filter(filter) => {
            records.retain(|_, record| !filter.matches(&record.metadata));
        }
    }
    before - records.len()
}

fn search(
    namespaces: &Namespaces,
    namespace: &str,
    vector: &[f32],
    top_k: usize,
    filter: &MetadataFilter,
) -> Vec<QueryMatch> {
    let Some(records) = namespaces.get(namespace) else {
        return Vec::new();
    };

    let mut results: Vec<QueryMatch> = records
        .values()
        .filter(|record| filter.matches(&record.metadata))
        .map(|record| QueryMatch {
            id: record.id.clone(),
            score: cosine_similarity(vector, &record.values),
            metadata: record.metadata.clone(),
        })
        .collect();

    // Sort by score descending
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);
    results
}

/// In-memory vector index.
pub struct InMemoryIndex {
    namespaces: RwLock<Namespaces>,
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Count records in a namespace.
    pub async fn count(&self, namespace: &str) -> usize {
        let namespaces = self.namespaces.read().await;
        namespaces.get(namespace).map_or(0, HashMap::len)
    }

    /// Snapshot every record in a namespace.
    pub async fn records(&self, namespace: &str) -> Vec<VectorRecord> {
        let namespaces = self.namespaces.read().await;
        namespaces
            .get(namespace)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        let target = namespaces.entry(namespace.to_string()).or_default();
        for record in records {
            target.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn fetch(&self, namespace: &str, ids: &[String]) -> Result<HashMap<String, VectorRecord>> {
        let namespaces = self.namespaces.read().await;
        Ok(fetch_from(&namespaces, namespace, ids))
    }

    async fn delete(&self, namespace: &str, selector: DeleteSelector) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        let removed = delete_from(&mut namespaces, namespace, &selector);
        debug!("Deleted {} records from {}", removed, namespace);
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<QueryMatch>> {
        let namespaces = self.namespaces.read().await;
        Ok(search(&namespaces, namespace, vector, top_k, filter))
    }
}

/// File-backed vector index with JSON persistence.
///
/// All mutations are persisted to disk via atomic writes (write to tmp, then rename).
pub struct FileIndex {
    path: PathBuf,
    namespaces: RwLock<Namespaces>,
}

impl FileIndex {
    /// Open a file-backed index.
    ///
    /// If the file at `path` exists, its contents are deserialized into memory.
    /// If the file does not exist, the index starts empty.
    pub fn new(path: PathBuf) -> Result<Self> {
        let namespaces = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            namespaces: RwLock::new(namespaces),
        })
    }

    /// Atomically persist the current records to disk.
    fn save(&self, namespaces: &Namespaces) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        let data = serde_json::to_string(namespaces)?;
        std::fs::write(&tmp_path, data)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for FileIndex {
    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        let target = namespaces.entry(namespace.to_string()).or_default();
        for record in records {
            target.insert(record.id.clone(), record);
        }
        self.save(&namespaces)
    }

    async fn fetch(&self, namespace: &str, ids: &[String]) -> Result<HashMap<String, VectorRecord>> {
        let namespaces = self.namespaces.read().await;
        Ok(fetch_from(&namespaces, namespace, ids))
    }

    async fn delete(&self, namespace: &str, selector: DeleteSelector) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        if delete_from(&mut namespaces, namespace, &selector) > 0 {
            self.save(&namespaces)?;
        }
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<QueryMatch>> {
        let namespaces = self.namespaces.read().await;
        Ok(search(&namespaces, namespace, vector, top_k, filter))
    }
}
