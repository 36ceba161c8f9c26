//! Per-user semantic answer cache.

use crate::embeddings::cosine_similarity;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    embedding: Vec<f32>,
    query: String,
    response: String,
}

/// A cache hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub query: String,
    pub response: String,
    pub similarity: f32,
}

/// Answers keyed by query embedding, looked up by similarity.
pub struct SemanticCache {
    threshold: f32,
    capacity: usize,
    entries: RwLock<HashMap<String, VecDeque<CacheEntry>>>,
}

impl SemanticCache {
    pub fn new(threshold: f32, capacity: usize) -> Self {
        Self {
            threshold,
            capacity: capacity.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Most similar cached answer for this user at or above the threshold.
    pub fn lookup(&self, user_id: &str, embedding: &[f32]) -> Option<CacheHit> {
        let entries = self.entries.read();
        let best = entries
            .get(user_id)?
            .iter()
            .map(|entry| (entry, cosine_similarity(embedding, &entry.embedding)))
            .filter(|(_, similarity)| *similarity >= self.threshold)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))?;

        debug!("Semantic cache hit for {} ({:.3})", user_id, best.1);
        Some(CacheHit {
            query: best.0.query.clone(),
            response: best.0.response.clone(),
            similarity: best.1,
        })
    }

    /// Remember an answer, evicting the user's oldest entry when full.
    pub fn insert(&self, user_id: &str, embedding: Vec<f32>, query: impl Into<String>, response: impl Into<String>) {
        let mut entries = self.entries.write();
        let bucket = entries.entry(user_id.to_string()).or_default();
        bucket.push_back(CacheEntry {
            embedding,
            query: query.into(),
            response: response.into(),
        });
        while bucket.len() > self.capacity {
            bucket.pop_front();
        }
    }

    /// Cached entries for a user.
    pub fn len(&self, user_id: &str) -> usize {
        self.entries.read().get(user_id).map_or(0, VecDeque::len)
    }

    /// Forget one user's answers.
    pub fn clear_user(&self, user_id: &str) {
        self.entries.write().remove(user_id);
    }

    /// Forget everything.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
