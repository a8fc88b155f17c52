use crate::bundle::BundleError;
use inscribe_pdf_composer::ComposerError;
use inscribe_placement::LayoutError;
use inscribe_roster::NameListError;
use inscribe_traits::FontError;
use thiserror::Error;

/// Errors that stop a batch before any job runs, or the tooling around it.
///
/// Per-job failures never surface here; they are recorded in the
/// [`BatchResult`](crate::BatchResult).
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Invalid layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("Invalid name list: {0}")]
    NameList(#[from] NameListError),

    #[error("Nothing to generate: no pages or recipients")]
    EmptyBatch,

    #[error("The name list has no recipients")]
    NoRecipients,

    #[error("No page is enabled for personalization")]
    NoEnabledPages,

    #[error("Template could not be read: {0}")]
    Template(#[from] ComposerError),

    #[error("{layouts} layouts given for a template with {pages} pages")]
    PageCountMismatch { layouts: usize, pages: usize },

    #[error("Output id '{0}' is used by more than one recipient")]
    DuplicateOutputId(String),

    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
