use super::job::{JobError, JobId, JobStatus};
use super::result::BatchSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// A progress event. Serialized with a `kind` tag, e.g.
/// `{"kind":"job","jobId":0,"status":"running",...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StatusEvent {
    #[serde(rename_all = "camelCase")]
    Job {
        job_id: JobId,
        output_id: String,
        page_number: u32,
        status: JobStatus,
        timestamp: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<JobError>,
    },
    /// Every job of a recipient reached a terminal state.
    #[serde(rename_all = "camelCase")]
    Document { output_id: String, complete: bool },
    #[serde(rename_all = "camelCase")]
    BatchComplete { summary: BatchSummary },
}

/// Fans status events out to subscribers.
///
/// Each subscriber has its own unbounded queue, so a slow consumer never
/// loses events or blocks the batch. Subscribers see only events emitted
/// after they subscribed.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    subscribers: Arc<Mutex<Vec<async_channel::Sender<StatusEvent>>>>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> StatusSubscription {
        let (tx, rx) = async_channel::unbounded();
        self.lock().push(tx);
        StatusSubscription { rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Delivers `event` to every live subscriber, dropping those that went away.
    pub fn emit(&self, event: StatusEvent) {
        self.lock().retain(|tx| tx.try_send(event.clone()).is_ok());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<async_channel::Sender<StatusEvent>>> {
        // A poisoned list is still a valid list of senders.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The receiving end of [`StatusReporter::subscribe`].
#[derive(Debug)]
pub struct StatusSubscription {
    rx: async_channel::Receiver<StatusEvent>,
}

impl StatusSubscription {
    /// Waits for the next event. `None` once the reporter is gone and the
    /// queue is drained.
    pub async fn recv(&self) -> Option<StatusEvent> {
        self.rx.recv().await.ok()
    }

    pub fn recv_blocking(&self) -> Option<StatusEvent> {
        self.rx.recv_blocking().ok()
    }

    pub fn try_recv(&self) -> Option<StatusEvent> {
        self.rx.try_recv().ok()
    }

    /// Every event queued so far.
    pub fn drain(&self) -> Vec<StatusEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
