use super::job::{JobError, JobId};
use inscribe_pdf_composer::{ComposerError, concat_pages};
use serde::{Deserialize, Serialize};

/// All output pages for one recipient, in template page order.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalizedDocument {
    pub output_id: String,
    pub raw_name: String,
    /// Position of the recipient in the name list.
    pub name_index: usize,
    /// One single-page PDF per template page.
    pub pages: Vec<Vec<u8>>,
}

impl PersonalizedDocument {
    /// Merges the pages into one PDF.
    pub fn to_pdf(&self) -> Result<Vec<u8>, ComposerError> {
        concat_pages(&self.pages)
    }
}

/// A failed job, with enough context to tell the user which name and page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFailure {
    pub job_id: JobId,
    pub output_id: String,
    pub raw_name: String,
    pub page_number: u32,
    pub error: JobError,
}

/// Outcome of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub total_jobs: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Jobs never dispatched because the batch was cancelled.
    pub pending: usize,
    pub cancelled: bool,
    pub failures: Vec<JobFailure>,
    /// Output ids of recipients with failed or never-run jobs, in name order.
    pub incomplete: Vec<String>,
    /// Completed documents, in name order.
    pub documents: Vec<PersonalizedDocument>,
}

impl BatchResult {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total_jobs: self.total_jobs,
            succeeded: self.succeeded,
            failed: self.failed,
            pending: self.pending,
            cancelled: self.cancelled,
            failures: self.failures.clone(),
            incomplete: self.incomplete.clone(),
            output_ids: self
                .documents
                .iter()
                .map(|doc| doc.output_id.clone())
                .collect(),
        }
    }

    pub fn document(&self, output_id: &str) -> Option<&PersonalizedDocument> {
        self.documents.iter().find(|doc| doc.output_id == output_id)
    }
}

/// [`BatchResult`] without page bytes, for status events and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_jobs: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pending: usize,
    pub cancelled: bool,
    pub failures: Vec<JobFailure>,
    pub incomplete: Vec<String>,
    pub output_ids: Vec<String>,
}
