use inscribe_layout::TextError;
use inscribe_pdf_composer::ComposerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Font '{family}' cannot render {ch:?}")]
    UnsupportedGlyph { ch: char, family: String },
    #[error("Malformed template page: {0}")]
    MalformedTemplate(String),
    #[error("Job needs about {required} bytes, over the budget of {budget}")]
    OutOfMemory { required: usize, budget: usize },
    #[error("Internal rendering error: {0}")]
    Internal(String),
}

/// The kind of a [`RenderError`], as reported to status consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderFailure {
    UnsupportedGlyph,
    MalformedTemplate,
    OutOfMemory,
    Internal,
}

impl RenderError {
    pub fn reason(&self) -> RenderFailure {
        match self {
            RenderError::UnsupportedGlyph { .. } => RenderFailure::UnsupportedGlyph,
            RenderError::MalformedTemplate(_) => RenderFailure::MalformedTemplate,
            RenderError::OutOfMemory { .. } => RenderFailure::OutOfMemory,
            RenderError::Internal(_) => RenderFailure::Internal,
        }
    }
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::MalformedTemplate(err.to_string())
    }
}

impl From<ComposerError> for RenderError {
    fn from(err: ComposerError) -> Self {
        match err {
            ComposerError::Io(e) => RenderError::Internal(e.to_string()),
            other => RenderError::MalformedTemplate(other.to_string()),
        }
    }
}

impl From<TextError> for RenderError {
    fn from(err: TextError) -> Self {
        match err {
            TextError::UnsupportedGlyph { ch, family } => {
                RenderError::UnsupportedGlyph { ch, family }
            }
            TextError::FontParse(family) => {
                RenderError::Internal(format!("font '{family}' could not be parsed"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_errors_keep_the_offending_character() {
        let err = RenderError::from(TextError::UnsupportedGlyph {
            ch: 'આ',
            family: "Arial".into(),
        });
        assert_eq!(err.reason(), RenderFailure::UnsupportedGlyph);
        assert!(err.to_string().contains("Arial"));
    }

    #[test]
    fn composer_errors_map_to_malformed_template() {
        let err = RenderError::from(ComposerError::NoPages);
        assert_eq!(err.reason(), RenderFailure::MalformedTemplate);
        let err = RenderError::from(ComposerError::MalformedResources("42".into()));
        assert_eq!(err.reason(), RenderFailure::MalformedTemplate);
        let err = RenderError::from(ComposerError::Io(std::io::Error::other("disk")));
        assert_eq!(err.reason(), RenderFailure::Internal);
    }

    #[test]
    fn reasons_serialize_in_camel_case() {
        let json = serde_json::to_string(&RenderFailure::OutOfMemory).unwrap();
        assert_eq!(json, "\"outOfMemory\"");
    }
}
