//! Pinecone vector store implementation.

use async_trait::async_trait;
use std::collections::HashMap;

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::traits::{VectorRecord, VectorSearchResult, VectorStore, VectorStoreConfig};
use sarthi_core::types::ChunkFilter;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Pinecone vector store over the data-plane REST API.
pub struct PineconeVectorStore {
    client: Client,
    api_key: String,
    index_host: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PineconeVector {
    id: String,
    values: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct PineconeQueryResponse {
    matches: Vec<PineconeMatch>,
}

impl PineconeVectorStore {
    /// Create a new Pinecone vector store.
    pub fn new(config: VectorStoreConfig) -> SarthiResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("PINECONE_API_KEY").ok())
            .ok_or_else(|| {
                SarthiError::Configuration(
                    "Pinecone API key required. Set PINECONE_API_KEY or provide api_key."
                        .to_string(),
                )
            })?;

        let index_host = config
            .url
            .clone()
            .or_else(|| std::env::var("PINECONE_INDEX_HOST").ok())
            .ok_or_else(|| {
                SarthiError::Configuration(
                    "Pinecone index host required. Set PINECONE_INDEX_HOST or provide url."
                        .to_string(),
                )
            })?;
        let index_host = index_host.trim_end_matches('/').to_string();
        let index_host = if index_host.starts_with("http") {
            index_host
        } else {
            format!("https://{}", index_host)
        };

        Ok(Self {
            client: Client::new(),
            api_key,
            index_host,
        })
    }

    fn headers(&self) -> SarthiResult<reqwest::header::HeaderMap> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Api-Key",
            self.api_key
                .parse()
                .map_err(|_| SarthiError::Configuration("Invalid Pinecone API key".to_string()))?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            "application/json"
                .parse()
                .map_err(|_| SarthiError::Configuration("Invalid header value".to_string()))?,
        );
        Ok(headers)
    }

    fn build_filter(filter: &ChunkFilter) -> serde_json::Value {
        let conditions: Vec<serde_json::Value> = filter
            .conditions()
            .into_iter()
            .map(|(field, value)| json!({ field: { "$eq": value } }))
            .collect();

        if conditions.len() == 1 {
            conditions.into_iter().next().unwrap_or_default()
        } else {
            json!({ "$and": conditions })
        }
    }
}

#[async_trait]
impl VectorStore for PineconeVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> SarthiResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let vectors: Vec<PineconeVector> = records
            .into_iter()
            .map(|r| PineconeVector {
                id: r.id,
                values: r.vector,
                metadata: if r.payload.is_empty() {
                    None
                } else {
                    Some(r.payload)
                },
            })
            .collect();

        let url = format!("{}/vectors/upsert", self.index_host);
        let body = json!({ "vectors": vectors });

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| SarthiError::vector_store(format!("Failed to upsert vectors: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(SarthiError::vector_store(format!(
                "Failed to upsert vectors: {}",
                error
            )));
        }

        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        filter: &ChunkFilter,
    ) -> SarthiResult<Vec<VectorSearchResult>> {
        let url = format!("{}/query", self.index_host);

        let body = json!({
            "vector": query_vector,
            "topK": limit,
            "includeMetadata": true,
            "filter": Self::build_filter(filter),
        });

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| SarthiError::vector_store(format!("Failed to query: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(SarthiError::vector_store(format!(
                "Failed to query: {}",
                error
            )));
        }

        let result: PineconeQueryResponse = response
            .json()
            .await
            .map_err(|e| SarthiError::vector_store(format!("Failed to parse response: {}", e)))?;

        let results = result
            .matches
            .into_iter()
            .map(|m| VectorSearchResult {
                id: m.id,
                score: m.score,
                payload: m.metadata.unwrap_or_default(),
            })
            .collect();

        Ok(results)
    }

    async fn delete_by_filter(&self, filter: &ChunkFilter) -> SarthiResult<()> {
        let url = format!("{}/vectors/delete", self.index_host);
        let body = json!({ "filter": Self::build_filter(filter) });

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| SarthiError::vector_store(format!("Failed to delete vectors: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(SarthiError::vector_store(format!(
                "Failed to delete vectors: {}",
                error
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_serializes_to_and_of_eq() {
        let filter = ChunkFilter::material("u1", "f1", "m1");
        let value = PineconeVectorStore::build_filter(&filter);
        let and = value["$and"].as_array().expect("three conditions use $and");
        assert_eq!(and.len(), 3);
        assert!(and
            .iter()
            .any(|c| c.get("material_id").map(|v| v["$eq"] == "m1") == Some(true)));
    }

    #[test]
    fn missing_host_is_a_config_error() {
        if std::env::var("PINECONE_INDEX_HOST").is_ok() {
            return;
        }
        let config = VectorStoreConfig {
            api_key: Some("pk-test".into()),
            ..Default::default()
        };
        assert!(matches!(
            PineconeVectorStore::new(config),
            Err(SarthiError::Configuration(_))
        ));
    }
}
