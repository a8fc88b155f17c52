//! Placement model for personalized pages.
//!
//! A [`PageLayout`] says where and how a guest name is drawn on one template
//! page. Layouts arrive as loosely typed [`PageLayoutRecord`]s (the editor's
//! serialized form) and become [`PageLayout`]s only through [`validate`].
//! A [`LayoutSet`] holds the full, gap-free array for a template and the
//! [`EditingSession`] models the interactive editor that produces it.

pub mod error;
pub mod font;
pub mod layout;
pub mod position;
pub mod session;
pub mod set;

pub use error::LayoutError;
pub use font::{Alignment, FontFamily};
pub use layout::{ColorValue, PageLayout, PageLayoutRecord, validate};
pub use position::{Position, normalize_position};
pub use session::EditingSession;
pub use set::LayoutSet;

pub const MIN_FONT_SIZE: f32 = 12.0;
pub const MAX_FONT_SIZE: f32 = 72.0;
pub const MIN_LINE_SPACING: f32 = 0.8;
pub const MAX_LINE_SPACING: f32 = 2.0;
