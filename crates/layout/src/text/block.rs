use crate::TextError;
use crate::fonts::ResolvedFont;
use crate::text::shaper::{ShapedLine, shape_line};
use inscribe_placement::Alignment;
use inscribe_types::Point;

/// Typographic parameters of a name block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStyle {
    pub font_size: f32,
    pub line_spacing: f32,
    pub alignment: Alignment,
}

/// A shaped line and the baseline origin it is drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedLine {
    pub origin: Point,
    pub line: ShapedLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<PositionedLine>,
    pub font_size: f32,
}

/// Baseline origins for lines of the given widths.
///
/// Each line sits in a line box `line_spacing * font_size` tall with its
/// glyph content (ascent plus descent) centered inside, the way CSS places
/// inline text. The stack of line boxes is centered on `anchor.y`.
/// Horizontally the anchor is the left edge, midpoint or right edge of each
/// line depending on the alignment.
pub fn line_origins(
    widths: &[f32],
    anchor: Point,
    style: &BlockStyle,
    ascent: f32,
    descent: f32,
) -> Vec<Point> {
    let pitch = style.line_spacing * style.font_size;
    let block_height = pitch * widths.len() as f32;
    let top = anchor.y + block_height / 2.0;
    let content = (ascent + descent) * style.font_size;
    let half_leading = (pitch - content) / 2.0;

    widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let x = match style.alignment {
                Alignment::Left => anchor.x,
                Alignment::Center => anchor.x - width / 2.0,
                Alignment::Right => anchor.x - width,
            };
            let y = top - i as f32 * pitch - half_leading - ascent * style.font_size;
            Point::new(x, y)
        })
        .collect()
}

/// Shapes every display line and positions the block around `anchor`.
pub fn layout_block(
    font: &ResolvedFont,
    family: &str,
    lines: &[String],
    anchor: Point,
    style: &BlockStyle,
) -> Result<TextBlock, TextError> {
    let shaped = lines
        .iter()
        .map(|text| shape_line(font, family, text, style.font_size))
        .collect::<Result<Vec<_>, _>>()?;

    let (ascent, descent) = font.vertical_metrics();
    let widths: Vec<f32> = shaped.iter().map(|line| line.width).collect();
    let origins = line_origins(&widths, anchor, style, ascent, descent);

    Ok(TextBlock {
        lines: shaped
            .into_iter()
            .zip(origins)
            .map(|(line, origin)| PositionedLine { origin, line })
            .collect(),
        font_size: style.font_size,
    })
}
