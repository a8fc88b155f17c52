//! Zip bundle of personalized documents.

use crate::pipeline::PersonalizedDocument;
use inscribe_pdf_composer::ComposerError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not assemble '{output_id}': {source}")]
    Compose {
        output_id: String,
        #[source]
        source: ComposerError,
    },
}

/// File name of a document inside the bundle.
pub fn entry_name(document: &PersonalizedDocument) -> String {
    format!("{}.pdf", document.output_id)
}

/// Writes one `<outputId>.pdf` per document, in the given order.
///
/// Entries carry a fixed timestamp (1980-01-01) so the same documents always
/// produce the same archive bytes. Returns the writer.
pub fn write_bundle<W: Write + Seek>(
    documents: &[PersonalizedDocument],
    writer: W,
) -> Result<W, BundleError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    for document in documents {
        let pdf = document.to_pdf().map_err(|source| BundleError::Compose {
            output_id: document.output_id.clone(),
            source,
        })?;
        zip.start_file(entry_name(document), options)?;
        zip.write_all(&pdf)?;
        debug!("Bundled {} ({} bytes)", entry_name(document), pdf.len());
    }

    let writer = zip.finish()?;
    info!("Wrote bundle with {} documents", documents.len());
    Ok(writer)
}

/// Writes the bundle to a file at `path`.
pub fn write_bundle_file<P: AsRef<Path>>(
    documents: &[PersonalizedDocument],
    path: P,
) -> Result<(), BundleError> {
    let file = File::create(path.as_ref())?;
    let mut writer = write_bundle(documents, BufWriter::new(file))?;
    writer.flush()?;
    Ok(())
}
