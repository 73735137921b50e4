//! Queued ingestion work items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{SourceType, StudyMaterial};

/// One queued unit of background ingestion work, referencing one material.
///
/// Consumed exactly once per delivery; terminal state is recorded on the
/// material row, not on the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingJob {
    pub job_id: String,
    pub material_id: String,
    pub frame_id: String,
    pub owner_id: String,
    pub source_uri: String,
    pub source_type: SourceType,
    pub enqueued_at: DateTime<Utc>,
}

impl ProcessingJob {
    /// Build a job for a freshly inserted material.
    pub fn for_material(material: &StudyMaterial) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            material_id: material.id.clone(),
            frame_id: material.frame_id.clone(),
            owner_id: material.owner_id.clone(),
            source_uri: material.source_uri.clone(),
            source_type: material.source_type,
            enqueued_at: Utc::now(),
        }
    }
}
