use thiserror::Error;

/// Rejections produced while validating layouts or assembling a layout set.
///
/// Every per-layout variant carries the offending page number so a caller
/// can point the user at the page to fix.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("page {page}: position ({x}, {y}) must lie within 0..=100 on both axes")]
    PositionOutOfRange { page: i64, x: f32, y: f32 },

    #[error("page {page}: font size {size} must lie within 12..=72")]
    FontSizeOutOfRange { page: i64, size: f32 },

    #[error("page {page}: line spacing {spacing} must lie within 0.8..=2.0")]
    LineSpacingOutOfRange { page: i64, spacing: f32 },

    #[error("page {page}: unknown font family '{family}'")]
    UnknownFontFamily { page: i64, family: String },

    #[error("page {page}: unknown alignment '{alignment}'")]
    UnknownAlignment { page: i64, alignment: String },

    #[error("page {page}: invalid font color: {reason}")]
    InvalidColor { page: i64, reason: String },

    #[error("page number {page} is invalid, page numbers start at 1")]
    InvalidPageNumber { page: i64 },

    #[error("page {page} has more than one layout")]
    DuplicatePage { page: u32 },

    #[error("page {page} has no layout")]
    MissingPage { page: u32 },

    #[error("Layout JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
