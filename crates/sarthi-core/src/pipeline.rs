//! Material ingestion pipeline.
//!
//! Drives one material through extract -> chunk -> embed -> summarize ->
//! persist status, emitting progress events along the way. Each job is
//! processed by exactly one worker; concurrent jobs share nothing but the
//! store clients.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::chunker::RecursiveTextChunker;
use crate::error::{SarthiError, SarthiResult};
use crate::index::ChunkIndex;
use crate::progress::{ProgressBus, ProgressStep};
use crate::prompts;
use crate::traits::{ChatLlm, MaterialStore, SourceExtractor};
use crate::types::{
    ChunkFilter, ChunkMetadata, ChunkRecord, ProcessingJob, ProcessingStatus, SourceType,
};

/// Registry of one extractor per source type.
#[derive(Default)]
pub struct ExtractorSet {
    extractors: HashMap<SourceType, Arc<dyn SourceExtractor>>,
}

impl ExtractorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor under its declared source type.
    pub fn register(mut self, extractor: Arc<dyn SourceExtractor>) -> Self {
        self.extractors.insert(extractor.source_type(), extractor);
        self
    }

    /// Look up the extractor for a source type.
    pub fn get(&self, source_type: SourceType) -> SarthiResult<&Arc<dyn SourceExtractor>> {
        self.extractors.get(&source_type).ok_or_else(|| {
            SarthiError::extraction(source_type, "no extractor registered for this source type")
        })
    }
}

/// The ingestion state machine.
pub struct MaterialPipeline {
    extractors: ExtractorSet,
    chunker: RecursiveTextChunker,
    index: Arc<ChunkIndex>,
    llm: Arc<dyn ChatLlm>,
    materials: Arc<dyn MaterialStore>,
    progress: ProgressBus,
}

impl MaterialPipeline {
    pub fn new(
        extractors: ExtractorSet,
        chunker: RecursiveTextChunker,
        index: Arc<ChunkIndex>,
        llm: Arc<dyn ChatLlm>,
        materials: Arc<dyn MaterialStore>,
        progress: ProgressBus,
    ) -> Self {
        Self {
            extractors,
            chunker,
            index,
            llm,
            materials,
            progress,
        }
    }

    pub fn progress(&self) -> &ProgressBus {
        &self.progress
    }

    /// Run one job to completion. Does not persist a failure status; the
    /// queue worker owns that decision after its retries are exhausted, so a
    /// retried job re-enters here with the material still `Processing`.
    pub async fn run(&self, job: &ProcessingJob) -> SarthiResult<()> {
        self.materials
            .set_status(&job.material_id, ProcessingStatus::Processing)
            .await?;
        self.progress
            .emit(&job.job_id, ProgressStep::Started, "processing started");

        self.progress.emit(
            &job.job_id,
            ProgressStep::Extracting,
            format!("extracting {}", job.source_type),
        );
        let extractor = self.extractors.get(job.source_type)?;
        let text = extractor.extract(&job.source_uri).await?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(SarthiError::NoTextExtracted {
                source_type: job.source_type,
            });
        }

        self.progress
            .emit(&job.job_id, ProgressStep::Chunking, "splitting text");
        let chunks = self.build_chunks(job, &text);
        info!(
            material_id = %job.material_id,
            chunks = chunks.len(),
            "material chunked"
        );

        self.progress
            .emit(&job.job_id, ProgressStep::Embedding, "storing embeddings");
        let filter = ChunkFilter::material(&job.owner_id, &job.frame_id, &job.material_id);
        self.index.replace_material(&filter, &chunks).await?;

        // Summary is an enhancement; a failure here never fails the job.
        self.progress
            .emit(&job.job_id, ProgressStep::Summarizing, "generating summary");
        let summary = match self.summarize(&text).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(material_id = %job.material_id, error = %e, "summarization failed, completing without summary");
                None
            }
        };

        self.materials
            .set_completed(&job.material_id, summary)
            .await?;
        self.progress
            .emit(&job.job_id, ProgressStep::Done, "processing completed");
        info!(material_id = %job.material_id, "material processed");
        Ok(())
    }

    /// Persist the failure after the queue has given up on a job: mark the
    /// material `Failed` and emit the terminal progress event. The queue
    /// records the failed job itself; both sides must happen.
    pub async fn record_failure(&self, job: &ProcessingJob, cause: &SarthiError) {
        // A job that died before reaching `run` may still be Pending; walk it
        // through Processing so observed statuses never skip a state.
        let _ = self
            .materials
            .set_status(&job.material_id, ProcessingStatus::Processing)
            .await;
        if let Err(e) = self
            .materials
            .set_status(&job.material_id, ProcessingStatus::Failed)
            .await
        {
            error!(material_id = %job.material_id, error = %e, "failed to persist failure status");
        }
        self.progress.emit(
            &job.job_id,
            ProgressStep::Failed,
            format!("failed: {cause}"),
        );
        error!(material_id = %job.material_id, error = %cause, "material processing failed");
    }

    fn build_chunks(&self, job: &ProcessingJob, text: &str) -> Vec<ChunkRecord> {
        let created_at = Utc::now();
        self.chunker
            .chunk(text)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| ChunkRecord {
                text,
                metadata: ChunkMetadata {
                    owner_id: job.owner_id.clone(),
                    frame_id: job.frame_id.clone(),
                    material_id: job.material_id.clone(),
                    source_type: job.source_type,
                    chunk_index,
                    created_at,
                },
            })
            .collect()
    }

    async fn summarize(&self, text: &str) -> SarthiResult<String> {
        let turns = prompts::build_summary_turns(text);
        self.llm
            .generate(&turns)
            .await
            .map_err(|e| SarthiError::summarization(e.to_string()))
    }
}
