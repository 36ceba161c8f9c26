//! Long-term memory types.

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of a long-term memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    /// Distilled statement about a user.
    Fact,
    /// Archived conversation exchange.
    Episodic,
    /// Shared reference material, not tied to a user.
    Knowledge,
}

impl MemoryType {
    /// Get the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fact => "fact",
            Self::Episodic => "episodic",
            Self::Knowledge => "knowledge",
        }
    }

    /// Whether memories of this kind must belong to a user.
    pub fn is_user_scoped(&self) -> bool {
        matches!(self, Self::Fact | Self::Episodic)
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fact" => Ok(Self::Fact),
            "episodic" => Ok(Self::Episodic),
            "knowledge" => Ok(Self::Knowledge),
            other => Err(Error::InvalidValue {
                field: "memory_type",
                value: other.to_string(),
            }),
        }
    }
}

/// Attributes attached to a memory.
///
/// `user_id` is the only attribute the system interprets; everything else is
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryAttributes {
    /// Owning user, mandatory for user-scoped memory kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Free-form extra attributes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl MemoryAttributes {
    /// Attributes owned by a user.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            extra: BTreeMap::new(),
        }
    }

    /// Add an extra attribute.
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A memory reconstructed from the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    /// Record id in the index.
    pub id: String,

    /// Memory text.
    pub content: String,

    /// Memory kind.
    pub memory_type: MemoryType,

    /// When the memory was stored.
    pub timestamp: DateTime<Utc>,

    /// Attributes stored alongside the memory.
    #[serde(default)]
    pub attributes: MemoryAttributes,
}

impl MemoryItem {
    /// The owning user, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.attributes.user_id.as_deref()
    }
}

/// A memory together with its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMemory {
    pub item: MemoryItem,
    pub score: f32,
}
