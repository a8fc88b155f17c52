//! Text layout for guest names: font resolution, shaping and placement of a
//! multi-line name block around an anchor point.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextError {
    #[error("Font '{family}' has no glyph for {ch:?}")]
    UnsupportedGlyph { ch: char, family: String },
    #[error("Font data for '{0}' could not be parsed")]
    FontParse(String),
}

pub mod fonts;
pub mod standard;
pub mod text;

pub use self::fonts::{EmbeddedFont, FontLibrary, FontSet, ResolvedFont};
pub use self::standard::StandardFont;
pub use self::text::{BlockStyle, LineGlyphs, TextBlock, layout_block};
