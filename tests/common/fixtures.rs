use inscribe::{FontFamily, PageLayout, Position};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

/// Builds a template whose pages each carry one Helvetica label. Pages
/// inherit their media box and resources from the page tree, as most
/// exported invitations do.
pub fn template_pdf(labels: &[&str]) -> Vec<u8> {
    template_pdf_sized(labels, 612, 792)
}

pub fn template_pdf_sized(labels: &[&str], width: i64, height: i64) -> Vec<u8> {
    build_template(labels, width, height, None)
}

/// A Letter template whose page tree asks viewers to turn every page by
/// `degrees` clockwise.
pub fn template_pdf_rotated(labels: &[&str], degrees: i64) -> Vec<u8> {
    build_template(labels, 612, 792, Some(degrees))
}

fn build_template(labels: &[&str], width: i64, height: i64, rotate: Option<i64>) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for label in labels {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![72.into(), 72.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(label.as_bytes().to_vec(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let mut pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => labels.len() as i64,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Resources" => resources_id,
    };
    if let Some(degrees) = rotate {
        pages.set("Rotate", degrees);
    }
    doc.objects.insert(pages_id, pages.into());
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// DejaVu Sans Mono: Latin, Greek and Cyrillic, but no Indic scripts.
pub fn mono_font() -> Vec<u8> {
    include_bytes!("../../assets/fonts/DejaVuSansMono.ttf").to_vec()
}

/// A layout drawing in Arial, which falls back to standard Helvetica.
pub fn layout(page_number: u32, enabled: bool) -> PageLayout {
    PageLayout {
        font_family: FontFamily::Arial,
        enabled,
        ..PageLayout::default_for_page(page_number)
    }
}

/// One layout per flag, numbered from 1.
pub fn layouts(enabled: &[bool]) -> Vec<PageLayout> {
    enabled
        .iter()
        .enumerate()
        .map(|(i, &on)| layout(i as u32 + 1, on))
        .collect()
}

pub fn layout_at(page_number: u32, x: f32, y: f32) -> PageLayout {
    PageLayout {
        position: Position::new(x, y),
        ..layout(page_number, true)
    }
}
