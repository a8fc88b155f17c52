mod common;

use common::fixtures::{layouts, mono_font, template_pdf};
use common::pdf_assertions::{dict_at, name_of, page_fonts};
use common::{GeneratedPdf, TestResult, init_logging};
use inscribe::{BatchBuilder, BatchOrchestrator, FontFamily, NameList, PageLayout, RenderFailure};
use lopdf::{Document, Object};

/// Renders Verdana layouts with DejaVu Sans Mono registered in its place.
fn embedded_orchestrator() -> BatchOrchestrator {
    init_logging();
    BatchBuilder::new()
        .with_system_fonts(false)
        .with_font_data("Verdana", mono_font())
        .and_then(BatchBuilder::build)
        .expect("orchestrator")
}

fn verdana_layouts(enabled: &[bool]) -> Vec<PageLayout> {
    layouts(enabled)
        .into_iter()
        .map(|layout| PageLayout {
            font_family: FontFamily::Verdana,
            ..layout
        })
        .collect()
}

/// Decoded bytes of the stream `key` references in `dict`.
fn stream_text(doc: &Document, dict: &lopdf::Dictionary, key: &[u8]) -> String {
    let id = dict.get(key).and_then(Object::as_reference).unwrap();
    let stream = doc.get_object(id).and_then(Object::as_stream).unwrap();
    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    String::from_utf8_lossy(&bytes).into_owned()
}

fn font_program_count(doc: &Document) -> usize {
    doc.objects
        .values()
        .filter_map(|object| object.as_stream().ok())
        .filter(|stream| stream.dict.has(b"Length1"))
        .count()
}

#[test]
fn non_latin_names_are_drawn_with_an_embedded_cid_font() -> TestResult {
    let template = template_pdf(&["cover", "inside"]);
    let names = NameList::parse("Asha Ωμέγα | Ελένη\nRavi")?;
    let result = embedded_orchestrator().run_blocking(
        &template,
        &verdana_layouts(&[true, true]),
        names.entries(),
    )?;

    assert_eq!(result.failed, 0);
    assert_eq!(result.documents.len(), 2);
    let pdf = GeneratedPdf::from_bytes(result.documents[0].to_pdf()?)?;

    for page in 1..=2 {
        let fonts = page_fonts(&pdf.doc, page);
        let type0 = fonts
            .iter()
            .find(|font| name_of(font, b"Subtype") == b"Type0")
            .expect("a Type0 font on the page");
        assert_eq!(name_of(type0, b"Encoding"), b"Identity-H");
        assert_eq!(name_of(type0, b"BaseFont"), b"DejaVuSansMono");

        let descendant = type0
            .get(b"DescendantFonts")
            .and_then(Object::as_array)
            .and_then(|fonts| fonts[0].as_reference())
            .and_then(|id| pdf.doc.get_object(id))
            .and_then(Object::as_dict)?;
        assert_eq!(name_of(descendant, b"Subtype"), b"CIDFontType2");
        assert!(!descendant.get(b"W").and_then(Object::as_array)?.is_empty());

        let descriptor = dict_at(&pdf.doc, descendant, b"FontDescriptor");
        let program = descriptor
            .get(b"FontFile2")
            .and_then(Object::as_reference)
            .and_then(|id| pdf.doc.get_object(id))
            .and_then(Object::as_stream)?;
        assert_eq!(name_of(&program.dict, b"Filter"), b"FlateDecode");

        // Both display lines are extractable as text.
        let cmap = stream_text(&pdf.doc, type0, b"ToUnicode");
        assert!(cmap.contains("03A9"), "Ω missing from ToUnicode:\n{cmap}");
        assert!(cmap.contains("0395"), "Ε missing from ToUnicode:\n{cmap}");
    }

    // One compressed copy of the font program serves both pages.
    assert_eq!(font_program_count(&pdf.doc), 1);
    assert!(pdf.bytes.len() < mono_font().len());
    Ok(())
}

#[test]
fn embedded_output_is_identical_across_runs() -> TestResult {
    let template = template_pdf(&["cover", "back"]);
    let layouts = verdana_layouts(&[true, false]);
    let names = NameList::parse("Ελένη | Asha\nRavi")?;

    let first = embedded_orchestrator().run_blocking(&template, &layouts, names.entries())?;
    let second = embedded_orchestrator().run_blocking(&template, &layouts, names.entries())?;

    assert_eq!(first.failed, 0);
    assert_eq!(first.documents, second.documents);
    assert_eq!(first.documents[0].to_pdf()?, second.documents[0].to_pdf()?);
    Ok(())
}

#[test]
fn glyph_missing_from_the_embedded_font_fails_the_job() -> TestResult {
    let template = template_pdf(&["cover"]);
    let names = NameList::from_names(["Ελένη", "આશા"])?;
    let result = embedded_orchestrator().run_blocking(
        &template,
        &verdana_layouts(&[true]),
        names.entries(),
    )?;

    assert_eq!(result.failed, 1);
    assert_eq!(result.failures[0].raw_name, "આશા");
    assert_eq!(result.failures[0].error.reason, RenderFailure::UnsupportedGlyph);
    assert_eq!(result.documents.len(), 1);
    assert_eq!(result.documents[0].raw_name, "Ελένη");
    Ok(())
}
