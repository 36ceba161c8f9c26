//! Pinecone data-plane client.

use super::{DeleteSelector, Metadata, MetadataFilter, QueryMatch, VectorIndex, VectorRecord};
use crate::error::MemoryError;
use crate::Result;
use async_trait::async_trait;
use ragmind_core::SecretString;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Data-plane API version sent with every request.
const API_VERSION: &str = "2024-07";

/// Vector index hosted by Pinecone.
pub struct PineconeIndex {
    client: Client,
    host: String,
    api_key: SecretString,
}

impl PineconeIndex {
    /// Connect to an index by its host URL.
    pub fn new(host: impl Into<String>, api_key: impl Into<SecretString>) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(MemoryError::Config("Pinecone host is required".to_string()));
        }
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("https://{}", host)
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Api-Key", self.api_key.expose_secret())
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    async fn check(response: Response, operation: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(MemoryError::index(format!("{} failed ({}): {}", operation, status, body)))
    }
}

/// Encode a filter as `{"field": {"$eq": value}}`.
fn encode_filter(filter: &MetadataFilter) -> Value {
    let clauses: serde_json::Map<String, Value> = filter
        .clauses()
        .map(|(field, value)| (field.clone(), json!({ "$eq": value })))
        .collect();
    Value::Object(clauses)
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    namespace: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Deserialize)]
struct RawMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, RawVector>,
}

#[derive(Deserialize)]
struct RawVector {
    id: String,
    #[serde(default)]
    values: Vec<f32>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> Result<()> {
        debug!("Upserting {} vectors into {}", records.len(), namespace);
        let response = self
            .post("/vectors/upsert")
            .json(&UpsertRequest {
                vectors: &records,
                namespace,
            })
            .send()
            .await?;
        Self::check(response, "upsert").await?;
        Ok(())
    }

    async fn fetch(&self, namespace: &str, ids: &[String]) -> Result<HashMap<String, VectorRecord>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut params: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", id.as_str())).collect();
        params.push(("namespace", namespace));

        let response = self
            .client
            .get(self.url("/vectors/fetch"))
            .header("Api-Key", self.api_key.expose_secret())
            .header("X-Pinecone-API-Version", API_VERSION)
            .query(&params)
            .send()
            .await?;
        let response: FetchResponse = Self::check(response, "fetch").await?.json().await?;

        Ok(response
            .vectors
            .into_iter()
            .map(|(key, raw)| {
                let record = VectorRecord::new(raw.id, raw.values, raw.metadata.unwrap_or_default());
                (key, record)
            })
            .collect())
    }

    async fn delete(&self, namespace: &str, selector: DeleteSelector) -> Result<()> {
        let body = match &selector {
            DeleteSelector::Ids(ids) => {
                if ids.is_empty() {
                    return Ok(());
                }
                json!({ "ids": ids, "namespace": namespace })
            }
            DeleteSelector::Filter(filter) => {
                // An empty filter would wipe the namespace.
                if filter.is_empty() {
                    return Err(MemoryError::index("Refusing to delete with an empty filter"));
                }
                json!({ "filter": encode_filter(filter), "namespace": namespace })
            }
        };

        let response = self.post("/vectors/delete").json(&body).send().await?;
        Self::check(response, "delete").await?;
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<QueryMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            namespace,
            filter: (!filter.is_empty()).then(|| encode_filter(filter)),
            include_metadata: true,
            include_values: false,
        };

        let response = self.post("/query").json(&request).send().await?;
        let response: QueryResponse = Self::check(response, "query").await?.json().await?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }
}
