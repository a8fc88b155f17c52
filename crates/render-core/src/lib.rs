//! Core rendering abstractions for page personalization.
//!
//! This crate provides the seam between the batch pipeline and concrete
//! renderers:
//! - `PageRenderer` trait: one template page, one layout, one name in, one
//!   personalized page out
//! - `RenderError` taxonomy and its serializable `RenderFailure` reason

mod error;
mod traits;

pub use error::{RenderError, RenderFailure};
pub use traits::PageRenderer;
