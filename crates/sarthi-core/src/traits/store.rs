//! Relational store traits for materials and messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SarthiResult;
use crate::types::{ChatRole, NewMaterial, ProcessingStatus, StoredMessage, StudyMaterial};

/// Title + summary pair used as auxiliary chat context.
#[derive(Debug, Clone)]
pub struct MaterialSummary {
    pub title: String,
    pub summary: String,
}

/// CRUD surface the pipeline and orchestrator need on material rows.
///
/// Implementations must be safe for concurrent use by multiple workers.
#[async_trait]
pub trait MaterialStore: Send + Sync {
    /// Insert a new material with status `Pending`; returns the stored row.
    async fn insert(&self, material: NewMaterial) -> SarthiResult<StudyMaterial>;

    /// Fetch one material by id.
    async fn get(&self, material_id: &str) -> SarthiResult<Option<StudyMaterial>>;

    /// Move a material to `status`. Rejects non-monotonic transitions.
    async fn set_status(&self, material_id: &str, status: ProcessingStatus) -> SarthiResult<()>;

    /// Mark a material `Completed` and store its summary (if any).
    async fn set_completed(&self, material_id: &str, summary: Option<String>) -> SarthiResult<()>;

    /// Summaries of completed materials in a frame, for auxiliary chat context.
    async fn frame_summaries(
        &self,
        owner_id: &str,
        frame_id: &str,
    ) -> SarthiResult<Vec<MaterialSummary>>;

    /// Materials still `Pending` since before `cutoff` - candidates for
    /// re-enqueueing after a crash between insert and enqueue.
    async fn stale_pending(&self, cutoff: DateTime<Utc>) -> SarthiResult<Vec<StudyMaterial>>;

    /// Delete every material in a frame. Vector cleanup is the caller's job.
    async fn delete_frame(&self, owner_id: &str, frame_id: &str) -> SarthiResult<()>;
}

/// Message persistence for frame conversations.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append one immutable message; returns the stored row.
    async fn insert(
        &self,
        frame_id: &str,
        owner_id: &str,
        role: ChatRole,
        content: &str,
    ) -> SarthiResult<StoredMessage>;

    /// The last `limit` messages of a frame in chronological order
    /// (selected most-recent-first, then reversed).
    async fn recent(&self, frame_id: &str, limit: usize) -> SarthiResult<Vec<StoredMessage>>;

    /// Delete every message in a frame.
    async fn delete_frame(&self, frame_id: &str) -> SarthiResult<()>;
}
