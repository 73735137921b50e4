//! Per-job progress broadcast channel.
//!
//! Fire-and-forget live feedback for UIs: the pipeline emits step events,
//! any number of subscribers listen per job id. Nothing is persisted and
//! subscribers connected after emission miss earlier events. Slow
//! subscribers lag and skip rather than blocking the pipeline.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default channel capacity.
const DEFAULT_CAPACITY: usize = 1024;

/// Pipeline step a progress event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStep {
    Started,
    Extracting,
    Chunking,
    Embedding,
    Summarizing,
    Done,
    Failed,
}

impl ProgressStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStep::Started => "started",
            ProgressStep::Extracting => "extracting",
            ProgressStep::Chunking => "chunking",
            ProgressStep::Embedding => "embedding",
            ProgressStep::Summarizing => "summarizing",
            ProgressStep::Done => "done",
            ProgressStep::Failed => "failed",
        }
    }
}

/// One progress update for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub job_id: String,
    pub step: ProgressStep,
    pub message: String,
}

/// Broadcast bus for progress events.
///
/// One tokio broadcast channel carries all jobs; `subscribe` filters to a
/// single job id. Emission never fails and never blocks; with no listeners
/// events are simply dropped.
pub struct ProgressBus {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit a progress event. Fire-and-forget.
    pub fn emit(&self, job_id: &str, step: ProgressStep, message: impl Into<String>) {
        let event = ProgressEvent {
            job_id: job_id.to_string(),
            step,
            message: message.into(),
        };
        let _ = self.sender.send(event);
    }

    /// Subscribe to the events of one job.
    pub fn subscribe(&self, job_id: &str) -> ProgressSubscriber {
        ProgressSubscriber {
            job_id: job_id.to_string(),
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscribers across all jobs.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ProgressBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Receives the progress events of a single job, in emission order.
pub struct ProgressSubscriber {
    job_id: String,
    receiver: broadcast::Receiver<ProgressEvent>,
}

impl ProgressSubscriber {
    /// Next event for this job, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.job_id == self.job_id => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(job_id = %self.job_id, skipped = n, "progress subscriber lagged");
                    continue;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_in_emission_order() {
        let bus = ProgressBus::new();
        let mut sub = bus.subscribe("job-1");

        bus.emit("job-1", ProgressStep::Started, "started");
        bus.emit("job-1", ProgressStep::Extracting, "extracting pdf");
        bus.emit("job-1", ProgressStep::Done, "done");

        assert_eq!(sub.recv().await.unwrap().step, ProgressStep::Started);
        assert_eq!(sub.recv().await.unwrap().step, ProgressStep::Extracting);
        assert_eq!(sub.recv().await.unwrap().step, ProgressStep::Done);
    }

    #[tokio::test]
    async fn filters_to_the_subscribed_job() {
        let bus = ProgressBus::new();
        let mut sub = bus.subscribe("job-a");

        bus.emit("job-b", ProgressStep::Started, "other job");
        bus.emit("job-a", ProgressStep::Started, "mine");

        let event = sub.recv().await.unwrap();
        assert_eq!(event.job_id, "job-a");
        assert_eq!(event.message, "mine");
    }

    #[tokio::test]
    async fn multiple_subscribers_all_receive() {
        let bus = ProgressBus::new();
        let mut one = bus.subscribe("job-1");
        let mut two = bus.subscribe("job-1");

        bus.emit("job-1", ProgressStep::Done, "done");

        assert_eq!(one.recv().await.unwrap().step, ProgressStep::Done);
        assert_eq!(two.recv().await.unwrap().step, ProgressStep::Done);
    }

    #[test]
    fn emitting_without_subscribers_is_fine() {
        let bus = ProgressBus::new();
        bus.emit("job-1", ProgressStep::Failed, "no listeners");
        assert_eq!(bus.subscriber_count(), 0);
    }
}
