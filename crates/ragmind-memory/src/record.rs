//! Typed records at the vector index boundary.
//!
//! The index only stores flat metadata maps. [`StoredMemory`] and
//! [`ProfileRecord`] own the conversion in both directions so the rest of the
//! crate never touches raw metadata.

use crate::error::MemoryError;
use crate::index::{Metadata, VectorRecord};
use crate::Result;
use chrono::{DateTime, TimeZone, Utc};
use ragmind_core::{MemoryAttributes, MemoryItem, MemoryType, UserProfile};
use serde_json::Value;
use tracing::warn;

/// Metadata `type` tag of profile records.
pub const PROFILE_RECORD_TYPE: &str = "user_profile";

mod field {
    pub const TEXT: &str = "text";
    pub const TYPE: &str = "type";
    pub const TIMESTAMP: &str = "timestamp";
    pub const ATTRIBUTES: &str = "attributes_json";
    pub const USER_ID: &str = "user_id";
    pub const PROFILE: &str = "profile_data";
}

/// Metadata field holding the owning user id.
pub const USER_ID_FIELD: &str = field::USER_ID;

/// Metadata field holding the memory type.
pub const TYPE_FIELD: &str = field::TYPE;

fn encode_timestamp(timestamp: DateTime<Utc>) -> String {
    let seconds = timestamp.timestamp() as f64 + f64::from(timestamp.timestamp_subsec_micros()) / 1e6;
    seconds.to_string()
}

fn decode_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let seconds = match value? {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    Utc.timestamp_opt(whole as i64, nanos.min(999_999_999)).single()
}

/// A memory as persisted in the memory namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMemory {
    pub item: MemoryItem,
}

impl StoredMemory {
    pub fn new(item: MemoryItem) -> Self {
        Self { item }
    }

    /// Encode as index metadata.
    ///
    /// `user_id` is lifted to a top-level field so it can be filtered on.
    pub fn to_metadata(&self) -> Result<Metadata> {
        let item = &self.item;
        let mut metadata = Metadata::new();
        metadata.insert(field::TEXT.into(), Value::String(item.content.clone()));
        metadata.insert(field::TYPE.into(), Value::String(item.memory_type.as_str().into()));
        metadata.insert(
            field::TIMESTAMP.into(),
            Value::String(encode_timestamp(item.timestamp)),
        );
        metadata.insert(
            field::ATTRIBUTES.into(),
            Value::String(serde_json::to_string(&item.attributes)?),
        );
        if let Some(user_id) = &item.attributes.user_id {
            metadata.insert(field::USER_ID.into(), Value::String(user_id.clone()));
        }
        Ok(metadata)
    }

    /// Build the vector record for this memory.
    pub fn to_record(&self, values: Vec<f32>) -> Result<VectorRecord> {
        Ok(VectorRecord::new(self.item.id.clone(), values, self.to_metadata()?))
    }

    /// Decode from index metadata.
    ///
    /// A missing `type` reads as `fact`. An unparseable timestamp falls back
    /// to the epoch and unreadable attributes to empty ones.
    pub fn from_metadata(id: &str, metadata: &Metadata) -> Result<Self> {
        let content = metadata
            .get(field::TEXT)
            .and_then(Value::as_str)
            .ok_or_else(|| MemoryError::corrupt(id, "missing text"))?
            .to_string();

        let memory_type = match metadata.get(field::TYPE).and_then(Value::as_str) {
            Some(tag) => tag
                .parse::<MemoryType>()
                .map_err(|e| MemoryError::corrupt(id, e.to_string()))?,
            None => MemoryType::Fact,
        };

        let timestamp = decode_timestamp(metadata.get(field::TIMESTAMP)).unwrap_or_default();

        let mut attributes: MemoryAttributes = match metadata.get(field::ATTRIBUTES).and_then(Value::as_str) {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable attributes on memory {}: {}", id, e);
                MemoryAttributes::default()
            }),
            None => MemoryAttributes::default(),
        };
        if attributes.user_id.is_none() {
            attributes.user_id = metadata
                .get(field::USER_ID)
                .and_then(Value::as_str)
                .map(str::to_string);
        }

        Ok(Self::new(MemoryItem {
            id: id.to_string(),
            content,
            memory_type,
            timestamp,
            attributes,
        }))
    }
}

/// A profile as persisted in the profile namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    pub profile: UserProfile,
}

impl ProfileRecord {
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }

    /// Placeholder vector profiles are stored on.
    ///
    /// Profiles are only ever fetched by id, but the index needs a non-zero
    /// vector of the configured dimension.
    pub fn placeholder_vector(dimension: usize) -> Vec<f32> {
        let mut values = vec![0.0; dimension.max(1)];
        values[0] = 1.0;
        values
    }

    pub fn to_metadata(&self) -> Result<Metadata> {
        let mut metadata = Metadata::new();
        metadata.insert(
            field::PROFILE.into(),
            Value::String(serde_json::to_string(&self.profile)?),
        );
        metadata.insert(field::TYPE.into(), Value::String(PROFILE_RECORD_TYPE.into()));
        Ok(metadata)
    }

    pub fn to_record(&self, dimension: usize) -> Result<VectorRecord> {
        Ok(VectorRecord::new(
            self.profile.user_id.clone(),
            Self::placeholder_vector(dimension),
            self.to_metadata()?,
        ))
    }

    pub fn from_metadata(id: &str, metadata: &Metadata) -> Result<Self> {
        let raw = metadata
            .get(field::PROFILE)
            .and_then(Value::as_str)
            .ok_or_else(|| MemoryError::corrupt(id, "missing profile_data"))?;
        let profile: UserProfile =
            serde_json::from_str(raw).map_err(|e| MemoryError::corrupt(id, e.to_string()))?;
        Ok(Self::new(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragmind_core::{RiskTolerance, StylePreference};
    use serde_json::json;

    fn sample_item() -> MemoryItem {
        MemoryItem {
            id: "m1".to_string(),
            content: "User: hi\nAgent: hello".to_string(),
            memory_type: MemoryType::Episodic,
            timestamp: Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap(),
            attributes: MemoryAttributes::for_user("alice_01").with("source", json!("chat")),
        }
    }

    #[test]
    fn test_memory_metadata_shape() {
        let metadata = StoredMemory::new(sample_item()).to_metadata().unwrap();

        assert_eq!(metadata["text"], "User: hi\nAgent: hello");
        assert_eq!(metadata["type"], "episodic");
        assert_eq!(metadata["timestamp"], "1700000000.5");
        assert_eq!(metadata["user_id"], "alice_01");

        let attributes: Value =
            serde_json::from_str(metadata["attributes_json"].as_str().unwrap()).unwrap();
        assert_eq!(attributes, json!({"user_id": "alice_01", "source": "chat"}));
    }

    #[test]
    fn test_memory_decodes_what_it_encodes() {
        let item = sample_item();
        let metadata = StoredMemory::new(item.clone()).to_metadata().unwrap();
        let decoded = StoredMemory::from_metadata("m1", &metadata).unwrap();
        assert_eq!(decoded.item, item);
    }

    #[test]
    fn test_knowledge_has_no_user_field() {
        let item = MemoryItem {
            memory_type: MemoryType::Knowledge,
            attributes: MemoryAttributes::default(),
            ..sample_item()
        };
        let metadata = StoredMemory::new(item).to_metadata().unwrap();
        assert!(!metadata.contains_key("user_id"));
    }

    #[test]
    fn test_memory_decode_tolerates_sparse_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("text".into(), json!("likes tea"));
        metadata.insert("user_id".into(), json!("bob"));
        metadata.insert("timestamp".into(), json!("not a number"));

        let decoded = StoredMemory::from_metadata("f1", &metadata).unwrap().item;
        assert_eq!(decoded.memory_type, MemoryType::Fact);
        assert_eq!(decoded.user_id(), Some("bob"));
        assert_eq!(decoded.timestamp.timestamp(), 0);
    }

    #[test]
    fn test_memory_decode_keeps_item_with_broken_attributes() {
        let mut metadata = Metadata::new();
        metadata.insert("text".into(), json!("likes tea"));
        metadata.insert("type".into(), json!("fact"));
        metadata.insert("user_id".into(), json!("bob"));
        metadata.insert("attributes_json".into(), json!("{not json"));

        let decoded = StoredMemory::from_metadata("f2", &metadata).unwrap().item;
        assert_eq!(decoded.content, "likes tea");
        assert_eq!(decoded.user_id(), Some("bob"));
    }

    #[test]
    fn test_memory_decode_rejects_bad_records() {
        let empty = Metadata::new();
        assert!(matches!(
            StoredMemory::from_metadata("x", &empty),
            Err(MemoryError::CorruptRecord { .. })
        ));

        let mut bad_type = Metadata::new();
        bad_type.insert("text".into(), json!("t"));
        bad_type.insert("type".into(), json!("dream"));
        assert!(StoredMemory::from_metadata("x", &bad_type).is_err());
    }

    #[test]
    fn test_profile_record_shape() {
        let profile = UserProfile::new("alice_01")
            .with_risk_tolerance(RiskTolerance::High)
            .with_style_preference(StylePreference::Concise);
        let record = ProfileRecord::new(profile.clone()).to_record(4).unwrap();

        assert_eq!(record.id, "alice_01");
        assert_eq!(record.values, vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(record.metadata["type"], "user_profile");

        let data: Value =
            serde_json::from_str(record.metadata["profile_data"].as_str().unwrap()).unwrap();
        assert_eq!(data["risk_tolerance"], "high");
        assert_eq!(data["style_preference"], "concise");

        let decoded = ProfileRecord::from_metadata("alice_01", &record.metadata).unwrap();
        assert_eq!(decoded.profile, profile);
    }

    #[test]
    fn test_profile_record_corrupt() {
        let mut metadata = Metadata::new();
        metadata.insert("profile_data".into(), json!("{not json"));
        assert!(ProfileRecord::from_metadata("u", &metadata).is_err());
        assert!(ProfileRecord::from_metadata("u", &Metadata::new()).is_err());
    }
}
