//! Reconciliation sweep for orphaned materials.
//!
//! Material insert and job enqueue are two separate calls with no shared
//! transaction; a crash between them leaves a `Pending` material with no
//! job. This periodic sweep re-enqueues anything stuck `Pending` past a
//! configured age.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::queue::MaterialQueue;
use crate::traits::MaterialStore;
use crate::types::ProcessingJob;

/// Periodically re-enqueues stale `Pending` materials.
pub struct PendingSweeper {
    materials: Arc<dyn MaterialStore>,
    queue: Arc<MaterialQueue>,
    stale_after: Duration,
    interval: Duration,
}

impl PendingSweeper {
    pub fn new(
        materials: Arc<dyn MaterialStore>,
        queue: Arc<MaterialQueue>,
        stale_after: Duration,
    ) -> Self {
        Self {
            materials,
            queue,
            interval: stale_after.max(Duration::from_secs(1)),
            stale_after,
        }
    }

    /// Spawn the background sweep task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick fires immediately; skip it so a fresh process
            // doesn't re-enqueue materials whose jobs are already queued.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.sweep_once().await;
            }
        })
    }

    /// One pass: re-enqueue every material pending since before the cutoff.
    pub async fn sweep_once(&self) {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.stale_after).unwrap_or(chrono::Duration::zero());
        let stale = match self.materials.stale_pending(cutoff).await {
            Ok(stale) => stale,
            Err(e) => {
                warn!(error = %e, "stale-pending scan failed");
                return;
            }
        };

        for material in stale {
            match self.queue.enqueue(ProcessingJob::for_material(&material)).await {
                Ok(job_id) => {
                    info!(material_id = %material.id, job_id, "re-enqueued stale pending material");
                }
                Err(e) => {
                    warn!(material_id = %material.id, error = %e, "re-enqueue failed");
                }
            }
        }
    }
}
