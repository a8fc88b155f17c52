use inscribe_render_core::{RenderError, RenderFailure};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a job within one batch. Jobs are numbered name-major,
/// page-minor starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// Why a job failed, in a form status consumers can serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobError {
    pub reason: RenderFailure,
    pub message: String,
}

impl From<&RenderError> for JobError {
    fn from(err: &RenderError) -> Self {
        Self {
            reason: err.reason(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// One (name, page) unit of work and its lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub id: JobId,
    pub name_index: usize,
    pub page_number: u32,
    pub status: JobStatus,
    /// Set only when `status` is `Failed`.
    pub error: Option<JobError>,
}

impl RenderJob {
    pub(crate) fn new(id: JobId, name_index: usize, page_number: u32) -> Self {
        Self {
            id,
            name_index,
            page_number,
            status: JobStatus::Pending,
            error: None,
        }
    }

    pub(crate) fn start(&mut self) {
        self.status = JobStatus::Running;
    }

    pub(crate) fn succeed(&mut self) {
        self.status = JobStatus::Succeeded;
    }

    pub(crate) fn fail(&mut self, error: JobError) {
        self.status = JobStatus::Failed;
        self.error = Some(error);
    }
}
