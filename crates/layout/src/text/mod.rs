pub mod block;
pub mod shaper;

pub use block::{BlockStyle, PositionedLine, TextBlock, layout_block, line_origins};
pub use shaper::{GlyphInstance, LineGlyphs, ShapedLine, shape_line};
