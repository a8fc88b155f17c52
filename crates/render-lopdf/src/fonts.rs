use inscribe_layout::{EmbeddedFont, LineGlyphs, ResolvedFont, StandardFont, TextBlock};
use inscribe_render_core::RenderError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Flate-compressed `FontFile2` streams, built once per font and shared by
/// every job of the renderer.
#[derive(Default)]
pub(crate) struct FontPrograms {
    streams: Mutex<HashMap<(String, u32, usize), Stream>>,
}

impl std::fmt::Debug for FontPrograms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self.streams.lock().map(|streams| streams.len()).unwrap_or(0);
        f.debug_struct("FontPrograms").field("cached", &cached).finish()
    }
}

impl FontPrograms {
    fn program(&self, font: &EmbeddedFont) -> Result<Stream, RenderError> {
        let key = (font.postscript_name.clone(), font.face_index, font.data.len());
        let mut streams = self
            .streams
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(stream) = streams.get(&key) {
            return Ok(stream.clone());
        }

        let mut stream = Stream::new(
            dictionary! { "Length1" => font.data.len() as i64 },
            font.data.to_vec(),
        );
        stream.compress().map_err(|e| {
            RenderError::Internal(format!("compressing font '{}': {e}", font.family))
        })?;
        log::debug!(
            "Compressed font program '{}' from {} to {} bytes",
            font.postscript_name,
            font.data.len(),
            stream.content.len()
        );
        streams.insert(key, stream.clone());
        Ok(stream)
    }
}

/// Adds the font object used by `block` to `doc` and returns its id.
pub(crate) fn write_font(
    doc: &mut Document,
    font: &ResolvedFont,
    block: &TextBlock,
    programs: &FontPrograms,
) -> Result<ObjectId, RenderError> {
    match font {
        ResolvedFont::Standard(standard) => Ok(write_standard_font(doc, *standard)),
        ResolvedFont::Embedded(embedded) => write_type0_font(doc, embedded, block, programs),
    }
}

fn write_standard_font(doc: &mut Document, font: StandardFont) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Glyphs drawn by the block: advance width in 1/1000 em and the text each
/// glyph stands for.
fn used_glyphs(block: &TextBlock) -> BTreeMap<u16, (f32, Option<String>)> {
    let mut used: BTreeMap<u16, (f32, Option<String>)> = BTreeMap::new();
    for positioned in &block.lines {
        let LineGlyphs::Cid(glyphs) = &positioned.line.glyphs else {
            continue;
        };
        for glyph in glyphs {
            let entry = used.entry(glyph.index).or_insert((glyph.width_1000, None));
            if entry.1.is_none() {
                entry.1 = glyph.text.clone();
            }
        }
    }
    used
}

fn scaled(value: i16, units_per_em: f32) -> i64 {
    (f32::from(value) * 1000.0 / units_per_em).round() as i64
}

fn font_descriptor(font: &EmbeddedFont, font_file_id: ObjectId) -> Result<Dictionary, RenderError> {
    let face = font
        .face()
        .ok_or_else(|| RenderError::Internal(format!("font '{}' could not be parsed", font.family)))?;
    let upem = f32::from(font.units_per_em.max(1));
    let bbox = face.global_bounding_box();
    let cap_height = face.capital_height().unwrap_or(font.ascender);

    Ok(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(font.postscript_name.clone().into_bytes()),
        "Flags" => 32,
        "FontBBox" => vec![
            scaled(bbox.x_min, upem).into(),
            scaled(bbox.y_min, upem).into(),
            scaled(bbox.x_max, upem).into(),
            scaled(bbox.y_max, upem).into(),
        ],
        "ItalicAngle" => 0,
        "Ascent" => scaled(font.ascender, upem),
        "Descent" => scaled(font.descender, upem),
        "CapHeight" => scaled(cap_height, upem),
        "StemV" => 80,
        "FontFile2" => font_file_id,
    })
}

/// Embeds the whole font program as a `Type0` font with `Identity-H`
/// encoding, so glyph ids from shaping are written as-is.
fn write_type0_font(
    doc: &mut Document,
    font: &EmbeddedFont,
    block: &TextBlock,
    programs: &FontPrograms,
) -> Result<ObjectId, RenderError> {
    let used = used_glyphs(block);

    let font_file_id = doc.add_object(programs.program(font)?);
    let descriptor_id = doc.add_object(font_descriptor(font, font_file_id)?);

    let mut widths = Vec::with_capacity(used.len() * 2);
    for (gid, (width, _)) in &used {
        widths.push(Object::Integer(i64::from(*gid)));
        widths.push(Object::Array(vec![Object::Integer(width.round() as i64)]));
    }

    let base_font = Object::Name(font.postscript_name.clone().into_bytes());
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => base_font.clone(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let glyph_text: BTreeMap<u16, String> = used
        .into_iter()
        .filter_map(|(gid, (_, text))| text.map(|text| (gid, text)))
        .collect();
    let to_unicode_id = doc.add_object(Stream::new(
        dictionary! {},
        to_unicode_cmap(&glyph_text).into_bytes(),
    ));

    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => to_unicode_id,
    }))
}

fn utf16_hex(text: &str) -> String {
    text.encode_utf16().map(|unit| format!("{unit:04X}")).collect()
}

/// A `ToUnicode` CMap mapping glyph ids back to their source text.
pub(crate) fn to_unicode_cmap(glyph_text: &BTreeMap<u16, String>) -> String {
    let mut out = String::new();
    out.push_str("/CIDInit /ProcSet findresource begin\n");
    out.push_str("12 dict begin\n");
    out.push_str("begincmap\n");
    out.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    out.push_str("/CMapName /Adobe-Identity-UCS def\n");
    out.push_str("/CMapType 2 def\n");
    out.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    let entries: Vec<(&u16, &String)> = glyph_text.iter().collect();
    // bfchar sections hold at most 100 entries
    for chunk in entries.chunks(100) {
        out.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, text) in chunk {
            out.push_str(&format!("<{:04X}> <{}>\n", gid, utf16_hex(text)));
        }
        out.push_str("endbfchar\n");
    }

    out.push_str("endcmap\n");
    out.push_str("CMapName currentdict /CMap defineresource pop\n");
    out.push_str("end\nend\n");
    out
}
