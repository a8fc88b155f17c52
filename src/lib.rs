//! Batch personalization of multi-page PDF templates.
//!
//! A template PDF is split into pages, each page gets a [`PageLayout`]
//! describing where and how a guest name is drawn, and every name in a
//! [`NameList`] produces one personalized copy of the template.
//!
//! ```ignore
//! use inscribe::{BatchBuilder, LayoutSet, NameList, Template};
//!
//! let template = Template::from_file("invite.pdf")?;
//! let layouts = template.default_layouts();
//! let names = NameList::parse("Asha Patel\nRavi|Kumar")?;
//! let result = BatchBuilder::new()
//!     .build()?
//!     .run_blocking(&std::fs::read("invite.pdf")?, layouts.as_slice(), names.entries())?;
//! inscribe::write_bundle_file(&result.documents, "invites.zip")?;
//! ```

pub mod bundle;
pub mod error;
pub mod pipeline;
pub mod template;

#[cfg(test)]
mod test_support;

pub use bundle::{BundleError, write_bundle, write_bundle_file};
pub use error::BatchError;
pub use pipeline::{
    BatchBuilder, BatchConfig, BatchOrchestrator, BatchResult, BatchSummary, CancelHandle,
    JobError, JobFailure, JobId, JobStatus, PersonalizedDocument, RenderJob, StatusEvent,
    StatusReporter, StatusSubscription,
};
pub use template::{Template, TemplatePage};

pub use inscribe_layout::{FontLibrary, FontSet};
pub use inscribe_placement::{
    Alignment, EditingSession, FontFamily, LayoutError, LayoutSet, PageLayout, Position,
    normalize_position, validate,
};
pub use inscribe_render_core::{PageRenderer, RenderError, RenderFailure};
pub use inscribe_render_lopdf::LopdfPageRenderer;
pub use inscribe_roster::{NameEntry, NameList, NameListError};
pub use inscribe_types::{Color, PageBox};
