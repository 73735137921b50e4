//! In-process job queue and worker pool.
//!
//! At-least-once delivery: a worker retries a failing job with exponential
//! backoff before recording it failed. Re-runs are safe because the pipeline
//! replaces a material's vectors instead of appending to them. Lifecycle
//! events (completed/failed) are broadcast for observability, mirroring the
//! progress bus.

use std::sync::{Arc, Mutex};

use backon::{ExponentialBuilder, Retryable};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::QueueConfig;
use crate::error::{SarthiError, SarthiResult};
use crate::pipeline::MaterialPipeline;
use crate::types::{ProcessingJob, StudyMaterial};

/// Queue lifecycle event, emitted after a job reaches a terminal state.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    Completed {
        job_id: String,
        material_id: String,
    },
    Failed {
        job_id: String,
        material_id: String,
        error: String,
    },
}

/// Bounded in-process queue of ingestion jobs with a worker pool.
pub struct MaterialQueue {
    tx: mpsc::Sender<ProcessingJob>,
    rx: Mutex<Option<mpsc::Receiver<ProcessingJob>>>,
    events: broadcast::Sender<QueueEvent>,
    config: QueueConfig,
}

impl MaterialQueue {
    pub fn new(config: QueueConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let (events, _) = broadcast::channel(256);
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            events,
            config,
        }
    }

    /// Enqueue a job; applies backpressure when the buffer is full.
    /// Returns the job id.
    pub async fn enqueue(&self, job: ProcessingJob) -> SarthiResult<String> {
        let job_id = job.job_id.clone();
        self.tx
            .send(job)
            .await
            .map_err(|_| SarthiError::queue("queue is closed"))?;
        Ok(job_id)
    }

    /// Convenience: build and enqueue the job for a freshly inserted material.
    pub async fn enqueue_material(&self, material: &StudyMaterial) -> SarthiResult<String> {
        self.enqueue(ProcessingJob::for_material(material)).await
    }

    /// Subscribe to job lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Spawn the worker pool. Each worker pulls jobs until the queue is
    /// dropped; each job is consumed by exactly one worker. Callable once.
    pub fn start(&self, pipeline: Arc<MaterialPipeline>) -> SarthiResult<Vec<JoinHandle<()>>> {
        let rx = self
            .rx
            .lock()
            .expect("queue receiver lock poisoned")
            .take()
            .ok_or_else(|| SarthiError::queue("worker pool already started"))?;

        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let workers = self.config.workers.max(1);
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            handles.push(tokio::spawn(Self::worker_loop(
                worker_id,
                rx.clone(),
                pipeline.clone(),
                self.events.clone(),
                self.config.max_attempts.max(1),
            )));
        }
        info!(workers, "material queue workers started");
        Ok(handles)
    }

    async fn worker_loop(
        worker_id: usize,
        rx: Arc<tokio::sync::Mutex<mpsc::Receiver<ProcessingJob>>>,
        pipeline: Arc<MaterialPipeline>,
        events: broadcast::Sender<QueueEvent>,
        max_attempts: usize,
    ) {
        loop {
            let job = {
                let mut rx = rx.lock().await;
                rx.recv().await
            };
            let Some(job) = job else {
                // Queue dropped; nothing more will arrive.
                return;
            };

            let outcome = {
                let pipeline = pipeline.clone();
                let job = job.clone();
                (move || {
                    let pipeline = pipeline.clone();
                    let job = job.clone();
                    async move { pipeline.run(&job).await }
                })
                .retry(ExponentialBuilder::default().with_max_times(max_attempts - 1))
                .notify(|err: &SarthiError, after| {
                    warn!(worker_id, error = %err, retry_in = ?after, "job attempt failed, retrying");
                })
                .await
            };

            match outcome {
                Ok(()) => {
                    info!(worker_id, job_id = %job.job_id, "job completed");
                    let _ = events.send(QueueEvent::Completed {
                        job_id: job.job_id.clone(),
                        material_id: job.material_id.clone(),
                    });
                }
                Err(err) => {
                    pipeline.record_failure(&job, &err).await;
                    let _ = events.send(QueueEvent::Failed {
                        job_id: job.job_id.clone(),
                        material_id: job.material_id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
    }
}
