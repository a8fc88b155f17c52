//! Page personalization renderer using lopdf.
//!
//! Draws a recipient's name onto a single-page template PDF as an overlay
//! content stream, embedding the shaped font when one was resolved.

mod content;
mod fonts;
mod renderer;

pub use renderer::{DEFAULT_MEMORY_BUDGET, LopdfPageRenderer};
