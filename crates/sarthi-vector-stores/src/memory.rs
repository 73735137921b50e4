//! Embedded in-memory vector store.
//!
//! Brute-force cosine similarity over a map. Not for production sizes, but it
//! honors the same scoping contract as the remote backends, which makes it
//! the reference implementation for tenancy behavior in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::traits::{VectorRecord, VectorSearchResult, VectorStore};
use sarthi_core::types::ChunkFilter;

/// In-memory vector store for local runs and tests.
#[derive(Default)]
pub struct MemoryVectorStore {
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored vectors, across all scopes.
    pub fn len(&self) -> usize {
        self.records.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> SarthiResult<()> {
        let mut map = self
            .records
            .write()
            .map_err(|_| SarthiError::vector_store("store lock poisoned"))?;
        for record in records {
            map.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        filter: &ChunkFilter,
    ) -> SarthiResult<Vec<VectorSearchResult>> {
        let map = self
            .records
            .read()
            .map_err(|_| SarthiError::vector_store("store lock poisoned"))?;

        let mut scored: Vec<VectorSearchResult> = map
            .values()
            .filter(|record| filter.matches(&record.payload))
            .map(|record| VectorSearchResult {
                id: record.id.clone(),
                score: Self::cosine_similarity(query_vector, &record.vector),
                payload: record.payload.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn delete_by_filter(&self, filter: &ChunkFilter) -> SarthiResult<()> {
        let mut map = self
            .records
            .write()
            .map_err(|_| SarthiError::vector_store("store lock poisoned"))?;
        map.retain(|_, record| !filter.matches(&record.payload));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, vector: Vec<f32>, owner: &str, frame: &str, material: &str) -> VectorRecord {
        let mut payload = HashMap::new();
        payload.insert("user_id".to_string(), json!(owner));
        payload.insert("frame_id".to_string(), json!(frame));
        payload.insert("material_id".to_string(), json!(material));
        payload.insert("text".to_string(), json!(format!("chunk {}", id)));
        VectorRecord::new(id, vector, payload)
    }

    #[tokio::test]
    async fn search_ranks_by_cosine_similarity() {
        let store = MemoryVectorStore::new();
        store
            .upsert(vec![
                record("a", vec![1.0, 0.0], "u1", "f1", "m1"),
                record("b", vec![0.0, 1.0], "u1", "f1", "m1"),
                record("c", vec![0.7, 0.7], "u1", "f1", "m1"),
            ])
            .await
            .unwrap();

        let filter = ChunkFilter::frame("u1", "f1");
        let results = store.search(&[1.0, 0.0], 2, &filter).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[1].id, "c");
    }

    #[tokio::test]
    async fn search_never_crosses_tenant_scope() {
        let store = MemoryVectorStore::new();
        store
            .upsert(vec![
                record("mine", vec![1.0, 0.0], "u1", "f1", "m1"),
                record("other-owner", vec![1.0, 0.0], "u2", "f1", "m1"),
                record("other-frame", vec![1.0, 0.0], "u1", "f2", "m1"),
            ])
            .await
            .unwrap();

        let filter = ChunkFilter::frame("u1", "f1");
        let results = store.search(&[1.0, 0.0], 10, &filter).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "mine");
    }

    #[tokio::test]
    async fn delete_by_filter_is_scoped_to_material() {
        let store = MemoryVectorStore::new();
        store
            .upsert(vec![
                record("a", vec![1.0, 0.0], "u1", "f1", "m1"),
                record("b", vec![1.0, 0.0], "u1", "f1", "m2"),
            ])
            .await
            .unwrap();

        store
            .delete_by_filter(&ChunkFilter::material("u1", "f1", "m1"))
            .await
            .unwrap();
        assert_eq!(store.len(), 1);

        let filter = ChunkFilter::frame("u1", "f1");
        let results = store.search(&[1.0, 0.0], 10, &filter).await.unwrap();
        assert_eq!(results[0].id, "b");
    }

    #[tokio::test]
    async fn upsert_overwrites_by_id() {
        let store = MemoryVectorStore::new();
        store
            .upsert(vec![record("a", vec![1.0, 0.0], "u1", "f1", "m1")])
            .await
            .unwrap();
        store
            .upsert(vec![record("a", vec![0.0, 1.0], "u1", "f1", "m1")])
            .await
            .unwrap();
        assert_eq!(store.len(), 1);
    }
}
