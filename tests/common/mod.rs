#![allow(dead_code)]

pub mod fixtures;
pub mod pdf_assertions;

use inscribe::{BatchBuilder, BatchError, BatchOrchestrator, BatchResult, NameList, PageLayout};
use lopdf::Document as LopdfDocument;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Asserts the output ids of a batch's documents, in order.
#[macro_export]
macro_rules! assert_output_ids {
    ($result:expr, [$($id:expr),* $(,)?]) => {{
        let ids: Vec<&str> = $result
            .documents
            .iter()
            .map(|doc| doc.output_id.as_str())
            .collect();
        let expected: Vec<&str> = vec![$($id),*];
        assert_eq!(ids, expected, "unexpected output ids");
    }};
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Decoded content stream of a 1-based page.
    pub fn page_content(&self, page_number: u32) -> String {
        pdf_assertions::page_content(&self.doc, page_number)
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// An orchestrator that only uses the standard PDF fonts, so results do not
/// depend on what is installed on the machine.
pub fn standard_orchestrator(concurrency: usize) -> BatchOrchestrator {
    init_logging();
    BatchBuilder::new()
        .with_system_fonts(false)
        .with_concurrency(concurrency)
        .build()
        .expect("orchestrator")
}

/// Runs a batch over a generated template with standard fonts.
pub fn run_batch(
    template: &[u8],
    layouts: &[PageLayout],
    names: &[&str],
) -> Result<BatchResult, BatchError> {
    let names = NameList::from_names(names)?;
    standard_orchestrator(4).run_blocking(template, layouts, names.entries())
}
