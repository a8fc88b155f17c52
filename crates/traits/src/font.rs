//! FontProvider trait for supplying font data to the renderer.
//!
//! Callers register fonts under the editor's family names; the renderer asks
//! for a family (plus a few known substitutes) and receives raw TTF/OTF bytes.

use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for font loading operations.
#[derive(Error, Debug, Clone)]
pub enum FontError {
    #[error("Font not found: {family}")]
    NotFound { family: String },

    #[error("Failed to load font '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("Invalid font data: {0}")]
    InvalidData(String),
}

/// Shared font data type (reference-counted bytes).
pub type SharedFontData = Arc<Vec<u8>>;

/// A face registered with a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDescriptor {
    pub family: String,
    /// Index of the face inside a font collection, 0 for plain TTF/OTF.
    pub face_index: u32,
}

/// A query for finding a font.
#[derive(Debug, Clone)]
pub struct FontQuery<'a> {
    /// Primary family name to search for
    pub family: &'a str,
    /// Families tried, in order, when the primary is missing
    pub fallbacks: &'a [&'a str],
}

impl<'a> FontQuery<'a> {
    pub fn new(family: &'a str) -> Self {
        Self {
            family,
            fallbacks: &[],
        }
    }

    pub fn with_fallbacks(mut self, fallbacks: &'a [&'a str]) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    fn families(&self) -> impl Iterator<Item = &'a str> + '_ {
        std::iter::once(self.family).chain(self.fallbacks.iter().copied())
    }
}

/// A source of font bytes, matched by family name (case-insensitive).
pub trait FontProvider: Send + Sync + Debug {
    /// Loads the first family of the query that the provider holds.
    fn load_font(&self, query: &FontQuery<'_>) -> Result<(FontDescriptor, SharedFontData), FontError>;

    fn has_font(&self, query: &FontQuery<'_>) -> bool;

    fn list_families(&self) -> Vec<String>;

    /// Returns a human-readable name for this provider (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// An in-memory font provider.
///
/// Fonts are stored in memory and must be pre-populated before use.
#[derive(Debug, Default)]
pub struct InMemoryFontProvider {
    fonts: RwLock<Vec<(FontDescriptor, SharedFontData)>>,
}

impl InMemoryFontProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers font bytes under `family`. A later registration of the same
    /// family does not replace an earlier one.
    ///
    /// # Errors
    ///
    /// Returns `FontError::LoadFailed` if the internal lock is poisoned.
    pub fn add_font(&self, family: impl Into<String>, data: Vec<u8>) -> Result<(), FontError> {
        self.add_font_shared(family, Arc::new(data))
    }

    /// Add a font with shared data.
    ///
    /// # Errors
    ///
    /// Returns `FontError::LoadFailed` if the internal lock is poisoned.
    pub fn add_font_shared(
        &self,
        family: impl Into<String>,
        data: SharedFontData,
    ) -> Result<(), FontError> {
        let family = family.into();
        let mut fonts = self.fonts.write().map_err(|_| FontError::LoadFailed {
            path: family.clone(),
            message: "font store lock poisoned".to_string(),
        })?;
        fonts.push((
            FontDescriptor {
                family,
                face_index: 0,
            },
            data,
        ));
        Ok(())
    }

    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.fonts.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_match(&self, query: &FontQuery<'_>) -> Option<(FontDescriptor, SharedFontData)> {
        let fonts = self.fonts.read().ok()?;
        query.families().find_map(|family| {
            fonts
                .iter()
                .find(|(d, _)| d.family.eq_ignore_ascii_case(family))
                .map(|(d, data)| (d.clone(), data.clone()))
        })
    }
}

impl FontProvider for InMemoryFontProvider {
    fn load_font(&self, query: &FontQuery<'_>) -> Result<(FontDescriptor, SharedFontData), FontError> {
        self.find_match(query).ok_or_else(|| FontError::NotFound {
            family: query.family.to_string(),
        })
    }

    fn has_font(&self, query: &FontQuery<'_>) -> bool {
        self.find_match(query).is_some()
    }

    fn list_families(&self) -> Vec<String> {
        let fonts = match self.fonts.read() {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };
        let mut families: Vec<_> = fonts.iter().map(|(d, _)| d.family.clone()).collect();
        families.sort();
        families.dedup();
        families
    }

    fn name(&self) -> &'static str {
        "InMemoryFontProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_provider_add_and_load() {
        let provider = InMemoryFontProvider::new();
        provider.add_font("Noto Sans Gujarati", b"gujarati".to_vec()).unwrap();

        let (descriptor, data) = provider
            .load_font(&FontQuery::new("noto sans gujarati"))
            .unwrap();
        assert_eq!(descriptor.family, "Noto Sans Gujarati");
        assert_eq!(&*data, b"gujarati");
    }

    #[test]
    fn test_in_memory_provider_not_found() {
        let provider = InMemoryFontProvider::new();
        let result = provider.load_font(&FontQuery::new("Arial"));
        assert!(matches!(result, Err(FontError::NotFound { family }) if family == "Arial"));
    }

    #[test]
    fn test_fallback_order() {
        let provider = InMemoryFontProvider::new();
        provider.add_font("Liberation Sans", b"liberation".to_vec()).unwrap();
        provider.add_font("Arimo", b"arimo".to_vec()).unwrap();

        let query = FontQuery::new("Arial").with_fallbacks(&["Arimo", "Liberation Sans"]);
        let (_, data) = provider.load_font(&query).unwrap();
        assert_eq!(&*data, b"arimo");
        assert!(provider.has_font(&query));
    }

    #[test]
    fn test_first_registration_wins() {
        let provider = InMemoryFontProvider::new();
        provider.add_font("Georgia", b"first".to_vec()).unwrap();
        provider.add_font("Georgia", b"second".to_vec()).unwrap();
        let (_, data) = provider.load_font(&FontQuery::new("Georgia")).unwrap();
        assert_eq!(&*data, b"first");
        assert_eq!(provider.list_families(), vec!["Georgia".to_string()]);
        assert_eq!(provider.len(), 2);
    }
}
