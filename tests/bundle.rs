mod common;

use common::fixtures::{layouts, template_pdf};
use common::{GeneratedPdf, TestResult, run_batch};
use inscribe::{write_bundle, write_bundle_file};
use std::fs::File;
use std::io::{Cursor, Read};

#[test]
fn bundle_holds_one_pdf_per_recipient() -> TestResult {
    let template = template_pdf(&["cover", "inside", "back"]);
    let result = run_batch(&template, &layouts(&[true, true, false]), &["Asha", "Asha", "Ravi"])?;
    let bytes = write_bundle(&result.documents, Cursor::new(Vec::new()))?.into_inner();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["asha-1.pdf", "asha-2.pdf", "ravi-1.pdf"]);

    for name in names {
        let mut pdf = Vec::new();
        archive.by_name(&name)?.read_to_end(&mut pdf)?;
        assert_eq!(GeneratedPdf::from_bytes(pdf)?.page_count(), 3);
    }
    Ok(())
}

#[test]
fn bundle_file_is_written_to_disk() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("invites.zip");
    let template = template_pdf(&["cover"]);
    let result = run_batch(&template, &layouts(&[true]), &["Asha"])?;

    write_bundle_file(&result.documents, &path)?;

    let archive = zip::ZipArchive::new(File::open(&path)?)?;
    assert_eq!(archive.len(), 1);
    Ok(())
}
