//! Chunk index: the embedding + vector-store client pair.
//!
//! Everything the rest of the core does against vectors goes through this
//! type, so tenant scoping and id construction live in exactly one place.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::SarthiResult;
use crate::types::{ChunkFilter, ChunkRecord, ScoredChunk};
use crate::traits::{Embedder, VectorRecord, VectorStore};

/// Embeds chunk text and moves it in and out of the vector store under a
/// mandatory owner+frame scope.
pub struct ChunkIndex {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl ChunkIndex {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Embed and upsert a batch of chunks. Ids follow the
    /// `{owner}_{frame}_{material}_{index}_{uuid}` scheme.
    pub async fn upsert_chunks(&self, chunks: &[ChunkRecord]) -> SarthiResult<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                let mut payload = chunk.metadata.to_payload();
                payload.insert("text".into(), chunk.text.clone().into());
                VectorRecord::new(chunk.metadata.vector_id(), vector, payload)
            })
            .collect();

        let count = records.len();
        self.store.upsert(records).await?;
        info!(count, "stored chunk embeddings");
        Ok(())
    }

    /// Replace a material's chunks wholesale: delete whatever an earlier run
    /// stored, then upsert. Makes at-least-once job redelivery converge to a
    /// single run's worth of vectors despite the random id suffix.
    pub async fn replace_material(
        &self,
        filter: &ChunkFilter,
        chunks: &[ChunkRecord],
    ) -> SarthiResult<()> {
        self.store.delete_by_filter(filter).await?;
        self.upsert_chunks(chunks).await
    }

    /// Embed the query and return the `top_k` nearest chunks inside the
    /// filter scope, each with its original text.
    pub async fn search(
        &self,
        query: &str,
        filter: &ChunkFilter,
        top_k: usize,
    ) -> SarthiResult<Vec<ScoredChunk>> {
        let query_vector = self.embedder.embed(query).await?;
        let results = self.store.search(&query_vector, top_k, filter).await?;
        debug!(hits = results.len(), "vector search");

        Ok(results
            .into_iter()
            .map(|r| {
                let text = r
                    .payload
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                ScoredChunk {
                    id: r.id,
                    score: r.score,
                    text,
                    payload: r.payload,
                }
            })
            .collect())
    }

    /// Bulk-delete everything in the filter scope (frame/material removal).
    pub async fn delete_scope(&self, filter: &ChunkFilter) -> SarthiResult<()> {
        self.store.delete_by_filter(filter).await
    }
}
