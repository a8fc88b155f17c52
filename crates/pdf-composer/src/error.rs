use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document has no pages")]
    NoPages,

    #[error("Page {0} does not exist")]
    PageNotFound(u32),

    #[error("Malformed page resources: {0}")]
    MalformedResources(String),
}
