//! Vector store trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SarthiResult;
use crate::types::ChunkFilter;

/// A vector record with payload, as stored by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique identifier.
    pub id: String,
    /// Vector embedding.
    pub vector: Vec<f32>,
    /// Metadata payload, including the original chunk text under `"text"`.
    pub payload: HashMap<String, serde_json::Value>,
}

impl VectorRecord {
    pub fn new(
        id: impl Into<String>,
        vector: Vec<f32>,
        payload: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            vector,
            payload,
        }
    }

    /// Get a payload value as a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }

    /// Original chunk text.
    pub fn text(&self) -> Option<&str> {
        self.get_string("text")
    }
}

/// Search result from a vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSearchResult {
    pub id: String,
    pub score: f32,
    pub payload: HashMap<String, serde_json::Value>,
}

/// Core vector store trait - all backends implement this.
///
/// Reads and deletes always carry a [`ChunkFilter`]; there is no unscoped
/// operation in the contract.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite vectors by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> SarthiResult<()>;

    /// Search for the nearest vectors inside the filter scope.
    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        filter: &ChunkFilter,
    ) -> SarthiResult<Vec<VectorSearchResult>>;

    /// Delete every vector inside the filter scope.
    async fn delete_by_filter(&self, filter: &ChunkFilter) -> SarthiResult<()>;
}

/// Vector store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: VectorStoreProvider,
    /// Index/collection name.
    #[serde(default = "default_index_name")]
    pub index_name: String,
    /// Embedding dimensions.
    #[serde(default = "default_embedding_dims")]
    pub embedding_dims: usize,
    /// API key (if not using an environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Data-plane URL (index host for Pinecone).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn default_index_name() -> String {
    "sarthi".to_string()
}

fn default_embedding_dims() -> usize {
    1536
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: VectorStoreProvider::default(),
            index_name: default_index_name(),
            embedding_dims: default_embedding_dims(),
            api_key: None,
            url: None,
        }
    }
}

/// Vector store provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreProvider {
    #[default]
    Pinecone,
    /// Embedded in-memory store for local runs and tests.
    Memory,
}
