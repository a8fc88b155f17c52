use crate::TextError;
use crate::fonts::{EmbeddedFont, ResolvedFont};
use crate::standard::{StandardFont, winansi_encode};
use rustybuzz::{Feature, UnicodeBuffer};
use std::cell::RefCell;
use ttf_parser::Tag;

// Reuse buffer to avoid allocations across jobs on the same worker
thread_local! {
    static SCRATCH_BUFFER: RefCell<Option<UnicodeBuffer>> = RefCell::new(Some(UnicodeBuffer::new()));
}

/// One shaped glyph, in points at the requested font size.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphInstance {
    pub index: u16,
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_advance: f32,
    /// Advance width from `hmtx` in 1/1000 em, used for the PDF `W` array.
    pub width_1000: f32,
    /// Source text of the cluster this glyph starts, for `ToUnicode`.
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineGlyphs {
    /// Single-byte codes for a base-14 font.
    WinAnsi(Vec<u8>),
    /// Glyph ids for an embedded `Identity-H` font.
    Cid(Vec<GlyphInstance>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapedLine {
    pub glyphs: LineGlyphs,
    pub width: f32,
}

/// Characters that need no glyph of their own.
fn is_invisible(ch: char) -> bool {
    ch.is_whitespace()
        || ch.is_control()
        || matches!(ch, '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

/// Shapes one display line with the resolved font.
///
/// Fails with [`TextError::UnsupportedGlyph`] on the first visible character
/// the font has no glyph for.
pub fn shape_line(
    font: &ResolvedFont,
    family: &str,
    text: &str,
    font_size: f32,
) -> Result<ShapedLine, TextError> {
    match font {
        ResolvedFont::Standard(standard) => shape_standard(*standard, family, text, font_size),
        ResolvedFont::Embedded(embedded) => shape_embedded(embedded, family, text, font_size),
    }
}

fn shape_standard(
    font: StandardFont,
    family: &str,
    text: &str,
    font_size: f32,
) -> Result<ShapedLine, TextError> {
    let mut codes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match winansi_encode(ch) {
            Some(code) => codes.push(code),
            None if ch.is_whitespace() => codes.push(b' '),
            None if is_invisible(ch) => {}
            None => {
                return Err(TextError::UnsupportedGlyph {
                    ch,
                    family: family.to_string(),
                });
            }
        }
    }
    let width = font.text_width(&codes, font_size);
    Ok(ShapedLine {
        glyphs: LineGlyphs::WinAnsi(codes),
        width,
    })
}

fn shape_embedded(
    font: &EmbeddedFont,
    family: &str,
    text: &str,
    font_size: f32,
) -> Result<ShapedLine, TextError> {
    let coverage = font
        .face()
        .ok_or_else(|| TextError::FontParse(font.family.clone()))?;
    if let Some(ch) = text
        .chars()
        .find(|&ch| !is_invisible(ch) && coverage.glyph_index(ch).is_none())
    {
        return Err(TextError::UnsupportedGlyph {
            ch,
            family: family.to_string(),
        });
    }

    let face = font
        .shaping_face()
        .ok_or_else(|| TextError::FontParse(font.family.clone()))?;

    static FEATURES: std::sync::OnceLock<Vec<Feature>> = std::sync::OnceLock::new();
    let features = FEATURES.get_or_init(|| {
        vec![
            Feature::new(Tag::from_bytes(b"liga"), 1, ..),
            Feature::new(Tag::from_bytes(b"kern"), 1, ..),
        ]
    });

    let upem = f32::from(font.units_per_em.max(1));
    let scale = font_size / upem;

    let mut buffer =
        SCRATCH_BUFFER.with(|b| b.borrow_mut().take().unwrap_or_else(UnicodeBuffer::new));
    buffer.push_str(text);
    buffer.guess_segment_properties();

    let glyph_buffer = rustybuzz::shape(&face, features, buffer);
    let infos = glyph_buffer.glyph_infos();
    let positions = glyph_buffer.glyph_positions();

    // Cluster starts in ascending order, to slice each cluster's text.
    let mut cluster_starts: Vec<usize> = infos.iter().map(|i| i.cluster as usize).collect();
    cluster_starts.sort_unstable();
    cluster_starts.dedup();

    let mut glyphs = Vec::with_capacity(infos.len());
    let mut seen_clusters = Vec::with_capacity(cluster_starts.len());
    let mut total_width = 0.0;

    for (info, pos) in infos.iter().zip(positions.iter()) {
        let cluster = info.cluster as usize;
        let gid = u16::try_from(info.glyph_id).unwrap_or(0);
        let x_advance = pos.x_advance as f32 * scale;

        let cluster_text = if seen_clusters.contains(&cluster) {
            None
        } else {
            seen_clusters.push(cluster);
            let end = cluster_starts
                .iter()
                .copied()
                .find(|&start| start > cluster)
                .unwrap_or(text.len());
            text.get(cluster..end).map(str::to_string)
        };

        let width_1000 = coverage
            .glyph_hor_advance(ttf_parser::GlyphId(gid))
            .map(|adv| f32::from(adv) * 1000.0 / upem)
            .unwrap_or(0.0);

        glyphs.push(GlyphInstance {
            index: gid,
            x_offset: pos.x_offset as f32 * scale,
            y_offset: pos.y_offset as f32 * scale,
            x_advance,
            width_1000,
            text: cluster_text,
        });
        total_width += x_advance;
    }

    let recycled_buffer = glyph_buffer.clear();
    SCRATCH_BUFFER.with(|b| *b.borrow_mut() = Some(recycled_buffer));

    Ok(ShapedLine {
        glyphs: LineGlyphs::Cid(glyphs),
        width: total_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const MONO: &[u8] = include_bytes!("../../../../assets/fonts/DejaVuSansMono.ttf");

    fn helvetica() -> ResolvedFont {
        ResolvedFont::Standard(StandardFont::Helvetica)
    }

    fn mono() -> ResolvedFont {
        let font = EmbeddedFont::from_data("DejaVu Sans Mono", Arc::new(MONO.to_vec()), 0).unwrap();
        ResolvedFont::Embedded(Arc::new(font))
    }

    #[test]
    fn latin_text_encodes_to_winansi() {
        let line = shape_line(&helvetica(), "Arial", "José", 10.0).unwrap();
        assert_eq!(line.glyphs, LineGlyphs::WinAnsi(vec![b'J', b'o', b's', 0xE9]));
        assert!(line.width > 0.0);
    }

    #[test]
    fn unusual_whitespace_becomes_space_and_format_chars_vanish() {
        let line = shape_line(&helvetica(), "Arial", "A\u{2003}B\u{200D}", 10.0).unwrap();
        assert_eq!(line.glyphs, LineGlyphs::WinAnsi(vec![b'A', b' ', b'B']));
    }

    #[test]
    fn script_outside_winansi_is_unsupported() {
        let err = shape_line(&helvetica(), "Noto Sans Gujarati", "Asha આશા", 10.0).unwrap_err();
        match err {
            TextError::UnsupportedGlyph { ch, family } => {
                assert_eq!(ch, 'આ');
                assert_eq!(family, "Noto Sans Gujarati");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn embedded_fonts_shape_to_glyph_ids() {
        let line = shape_line(&mono(), "Verdana", "Ωμέγα", 10.0).unwrap();
        let LineGlyphs::Cid(glyphs) = &line.glyphs else {
            panic!("expected CID glyphs, got {:?}", line.glyphs);
        };
        assert_eq!(glyphs.len(), 5);
        assert!(glyphs.iter().all(|glyph| glyph.index != 0));

        // Monospaced: one advance for every glyph, and the line is their sum.
        let advance = glyphs[0].x_advance;
        assert!(advance > 0.0);
        assert!(glyphs.iter().all(|glyph| (glyph.x_advance - advance).abs() < 1e-3));
        assert!((line.width - 5.0 * advance).abs() < 1e-3);
        assert!(glyphs[0].width_1000 > 0.0);

        let text: String = glyphs.iter().filter_map(|glyph| glyph.text.clone()).collect();
        assert_eq!(text, "Ωμέγα");
    }

    #[test]
    fn embedded_font_without_the_script_is_unsupported() {
        let err = shape_line(&mono(), "Verdana", "Asha આશા", 10.0).unwrap_err();
        assert!(matches!(err, TextError::UnsupportedGlyph { ch: 'આ', .. }));
    }
}
