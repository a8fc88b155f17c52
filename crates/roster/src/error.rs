use thiserror::Error;

#[derive(Error, Debug)]
pub enum NameListError {
    #[error("The name list contains no recipients")]
    NoRecipients,

    /// `position` is the 1-based line (text sources) or item (JSON and
    /// programmatic sources) holding the blank name.
    #[error("Recipient at position {position} has no visible text")]
    EmptyName { position: usize },

    #[error("Name list JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
