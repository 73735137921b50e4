//! Transient chunk records flowing from the chunker into the vector store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::SourceType;

/// Tenant and provenance metadata attached to every stored vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub owner_id: String,
    pub frame_id: String,
    pub material_id: String,
    pub source_type: SourceType,
    /// Position of this chunk within the extracted text.
    pub chunk_index: usize,
    pub created_at: DateTime<Utc>,
}

impl ChunkMetadata {
    /// Flatten into the key/value payload stored alongside the vector.
    /// Field names match the original deployment's index schema.
    pub fn to_payload(&self) -> HashMap<String, serde_json::Value> {
        let mut payload = HashMap::new();
        payload.insert("user_id".into(), self.owner_id.clone().into());
        payload.insert("frame_id".into(), self.frame_id.clone().into());
        payload.insert("material_id".into(), self.material_id.clone().into());
        payload.insert("doc_type".into(), self.source_type.as_str().into());
        payload.insert("chunk_index".into(), (self.chunk_index as u64).into());
        payload.insert("created_at".into(), self.created_at.to_rfc3339().into());
        payload
    }

    /// Globally unique vector id: tenant-scoped prefix plus a random suffix
    /// so retries can never collide with vectors of another material.
    pub fn vector_id(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.owner_id,
            self.frame_id,
            self.material_id,
            self.chunk_index,
            Uuid::new_v4()
        )
    }
}

/// A bounded slice of extracted text plus its metadata. Never persisted as a
/// row; lives only for the duration of one pipeline run.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// A chunk returned from a similarity search, with its original text.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub payload: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ChunkMetadata {
        ChunkMetadata {
            owner_id: "owner-a".into(),
            frame_id: "frame-1".into(),
            material_id: "mat-9".into(),
            source_type: SourceType::Pdf,
            chunk_index: 3,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn vector_id_embeds_scope_and_is_unique() {
        let m = meta();
        let a = m.vector_id();
        let b = m.vector_id();
        assert!(a.starts_with("owner-a_frame-1_mat-9_3_"));
        assert_ne!(a, b);
    }

    #[test]
    fn payload_carries_tenant_fields() {
        let payload = meta().to_payload();
        assert_eq!(payload["user_id"], "owner-a");
        assert_eq!(payload["frame_id"], "frame-1");
        assert_eq!(payload["material_id"], "mat-9");
        assert_eq!(payload["doc_type"], "pdf");
        assert_eq!(payload["chunk_index"], 3);
    }
}
