mod common;

use common::TestResult;
use common::fixtures::{layouts, template_pdf};
use inscribe::LayoutSet;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn inscribe(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_inscribe"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run inscribe")
}

fn write_inputs(dir: &Path, enabled: &[bool], names: &str) -> TestResult {
    let labels: Vec<String> = (1..=enabled.len()).map(|i| format!("page {i}")).collect();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    fs::write(dir.join("template.pdf"), template_pdf(&labels))?;
    fs::write(
        dir.join("layouts.json"),
        LayoutSet::new(layouts(enabled))?.to_json()?,
    )?;
    fs::write(dir.join("names.txt"), names)?;
    Ok(())
}

const GENERATE: [&str; 7] = [
    "generate",
    "--template",
    "template.pdf",
    "--layouts",
    "layouts.json",
    "--names",
    "names.txt",
];

#[test]
fn generate_writes_one_pdf_per_name() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_inputs(dir.path(), &[true, false], "Asha\nAsha\n# skipped\nRavi|Kumar\n")?;

    let mut args = GENERATE.to_vec();
    args.extend(["--output", "out", "--no-system-fonts"]);
    let output = inscribe(&args, dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let mut files: Vec<String> = fs::read_dir(dir.path().join("out"))?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    files.sort();
    assert_eq!(files, vec!["asha-1.pdf", "asha-2.pdf", "ravi-kumar-1.pdf"]);
    Ok(())
}

#[test]
fn generate_can_write_a_zip_and_stream_events() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_inputs(dir.path(), &[true], "Asha\n")?;

    let mut args = GENERATE.to_vec();
    args.extend(["--output", "invites.zip", "--no-system-fonts", "--events"]);
    let output = inscribe(&args, dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("invites.zip").exists());

    let stdout = String::from_utf8(output.stdout)?;
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    let kinds: Vec<&str> = events.iter().filter_map(|e| e["kind"].as_str()).collect();
    assert_eq!(kinds, vec!["job", "job", "job", "document", "batchComplete"]);
    assert_eq!(events[4]["summary"]["succeeded"], 1);
    Ok(())
}

#[test]
fn generate_fails_without_names() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_inputs(dir.path(), &[true], "# nobody yet\n")?;

    let mut args = GENERATE.to_vec();
    args.extend(["--output", "out", "--no-system-fonts"]);
    let output = inscribe(&args, dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
    assert!(!dir.path().join("out").exists());
    Ok(())
}

#[test]
fn init_layouts_writes_one_default_per_page() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("template.pdf"), template_pdf(&["a", "b", "c"]))?;

    let output = inscribe(
        &["init-layouts", "--template", "template.pdf", "--output", "layouts.json"],
        dir.path(),
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let layouts = LayoutSet::from_json(&fs::read_to_string(dir.path().join("layouts.json"))?)?;
    assert_eq!(layouts.len(), 3);
    assert_eq!(layouts.enabled_count(), 3);
    Ok(())
}
