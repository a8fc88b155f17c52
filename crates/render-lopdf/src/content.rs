use inscribe_layout::{LineGlyphs, TextBlock};
use inscribe_types::Color;
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

/// Reals are written with at most three decimals so output bytes do not
/// depend on float formatting noise.
fn real(value: f32) -> Object {
    Object::Real((value * 1000.0).round() / 1000.0)
}

fn text_matrix(x: f32, y: f32) -> Operation {
    Operation::new(
        "Tm",
        vec![1.into(), 0.into(), 0.into(), 1.into(), real(x), real(y)],
    )
}

/// Operations drawing every line of `block` with the font registered under
/// `font_name`, wrapped in their own graphics state. `transform` maps the
/// block's coordinate space onto the page's user space.
pub(crate) fn name_operations(
    block: &TextBlock,
    font_name: &str,
    color: Color,
    transform: Option<[f32; 6]>,
) -> Vec<Operation> {
    let [r, g, b] = color.to_unit_rgb();
    let mut ops = vec![Operation::new("q", vec![])];
    if let Some(matrix) = transform {
        ops.push(Operation::new(
            "cm",
            matrix.iter().map(|&value| real(value)).collect(),
        ));
    }
    ops.extend([
        Operation::new("rg", vec![real(r), real(g), real(b)]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(font_name.as_bytes().to_vec()),
                real(block.font_size),
            ],
        ),
    ]);

    for positioned in &block.lines {
        let origin = positioned.origin;
        match &positioned.line.glyphs {
            LineGlyphs::WinAnsi(codes) => {
                if codes.is_empty() {
                    continue;
                }
                ops.push(text_matrix(origin.x, origin.y));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(codes.clone(), StringFormat::Literal)],
                ));
            }
            LineGlyphs::Cid(glyphs) => {
                // One show per glyph keeps shaping offsets exact.
                let mut pen = origin.x;
                for glyph in glyphs {
                    ops.push(text_matrix(
                        pen + glyph.x_offset,
                        origin.y + glyph.y_offset,
                    ));
                    ops.push(Operation::new(
                        "Tj",
                        vec![Object::String(
                            glyph.index.to_be_bytes().to_vec(),
                            StringFormat::Hexadecimal,
                        )],
                    ));
                    pen += glyph.x_advance;
                }
            }
        }
    }

    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));
    ops
}

pub(crate) fn encode(operations: Vec<Operation>) -> Result<Vec<u8>, lopdf::Error> {
    Content { operations }.encode()
}
