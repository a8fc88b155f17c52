//! Font resolution for name rendering.
//!
//! A [`FontLibrary`] gathers font sources (registered providers, system
//! fonts and font directories via fontdb) and resolves every supported
//! family exactly once into an immutable [`FontSet`]. Families that no
//! source can satisfy fall back to a PDF base-14 font.
//!
//! ## Platform Abstraction
//!
//! - **System fonts mode** (feature: `system-fonts`): fontdb discovery
//! - **Provider mode**: injected `FontProvider`s only

use crate::standard::StandardFont;
use inscribe_placement::FontFamily;
use inscribe_traits::{FontError, FontProvider, FontQuery, SharedFontData};
use std::collections::HashMap;
use std::sync::Arc;

/// Names under which each editor family may be installed. The first entry
/// is the family itself, the rest are metric-compatible substitutes.
pub fn family_candidates(family: FontFamily) -> &'static [&'static str] {
    match family {
        FontFamily::NotoSansGujarati => &["Noto Sans Gujarati", "Noto Sans Gujarati UI"],
        FontFamily::Arial => &["Arial", "Liberation Sans", "Arimo"],
        FontFamily::TimesNewRoman => &["Times New Roman", "Liberation Serif", "Tinos"],
        FontFamily::Georgia => &["Georgia", "Gelasio"],
        FontFamily::Verdana => &["Verdana", "DejaVu Sans"],
    }
}

pub fn standard_fallback(family: FontFamily) -> StandardFont {
    if family.is_serif() {
        StandardFont::TimesRoman
    } else {
        StandardFont::Helvetica
    }
}

/// A TrueType/OpenType face ready for shaping and embedding.
pub struct EmbeddedFont {
    pub family: String,
    pub postscript_name: String,
    pub data: SharedFontData,
    pub face_index: u32,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
}

impl std::fmt::Debug for EmbeddedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedFont")
            .field("family", &self.family)
            .field("postscript_name", &self.postscript_name)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl EmbeddedFont {
    /// Parses the face header and keeps the bytes for later embedding.
    pub fn from_data(
        family: &str,
        data: SharedFontData,
        face_index: u32,
    ) -> Result<Self, FontError> {
        let face = ttf_parser::Face::parse(&data, face_index)
            .map_err(|e| FontError::InvalidData(format!("{}: {}", family, e)))?;

        let postscript_name = face
            .names()
            .into_iter()
            .find(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|name| name.to_string())
            .unwrap_or_else(|| family.replace(' ', ""));

        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();

        Ok(Self {
            family: family.to_string(),
            postscript_name: sanitize_postscript_name(&postscript_name),
            data,
            face_index,
            units_per_em,
            ascender,
            descender,
        })
    }

    /// Creates a lightweight ttf-parser view over the font data.
    pub fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.face_index).ok()
    }

    /// Creates a lightweight Face view for shaping.
    pub fn shaping_face(&self) -> Option<rustybuzz::Face<'_>> {
        rustybuzz::Face::from_slice(&self.data, self.face_index)
    }
}

fn sanitize_postscript_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%#".contains(*c))
        .collect();
    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}

/// The font a family resolved to.
#[derive(Debug, Clone)]
pub enum ResolvedFont {
    Standard(StandardFont),
    Embedded(Arc<EmbeddedFont>),
}

impl ResolvedFont {
    /// Ascender and descender depth as fractions of the em, both positive.
    pub fn vertical_metrics(&self) -> (f32, f32) {
        match self {
            ResolvedFont::Standard(font) => (font.ascent() / 1000.0, font.descent() / 1000.0),
            ResolvedFont::Embedded(font) => {
                let upem = f32::from(font.units_per_em.max(1));
                (
                    f32::from(font.ascender) / upem,
                    f32::from(font.descender).abs() / upem,
                )
            }
        }
    }

    /// Bytes this font adds to a rendered page when embedded.
    pub fn embedded_size(&self) -> usize {
        match self {
            ResolvedFont::Standard(_) => 0,
            ResolvedFont::Embedded(font) => font.data.len(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ResolvedFont::Standard(font) => font.base_font().to_string(),
            ResolvedFont::Embedded(font) => format!("{} ({})", font.family, font.postscript_name),
        }
    }
}

/// Every supported family resolved to a concrete font. Immutable and shared
/// by all render jobs of a batch.
#[derive(Debug, Clone)]
pub struct FontSet {
    fonts: HashMap<FontFamily, ResolvedFont>,
}

impl FontSet {
    /// A set that uses the base-14 fallbacks for every family.
    pub fn standard_only() -> Self {
        Self {
            fonts: FontFamily::ALL
                .into_iter()
                .map(|family| (family, ResolvedFont::Standard(standard_fallback(family))))
                .collect(),
        }
    }

    pub fn get(&self, family: FontFamily) -> ResolvedFont {
        self.fonts
            .get(&family)
            .cloned()
            .unwrap_or_else(|| ResolvedFont::Standard(standard_fallback(family)))
    }

    pub fn insert(&mut self, family: FontFamily, font: ResolvedFont) {
        self.fonts.insert(family, font);
    }

    /// The largest embedded font in the set, in bytes.
    pub fn max_embedded_size(&self) -> usize {
        self.fonts.values().map(ResolvedFont::embedded_size).max().unwrap_or(0)
    }
}

impl Default for FontSet {
    fn default() -> Self {
        Self::standard_only()
    }
}

/// Font sources consulted when building a [`FontSet`].
///
/// Resolution order per family:
/// 1. Registered `FontProvider`s, in registration order
/// 2. fontdb database (system fonts and font directories)
/// 3. Base-14 fallback
#[derive(Default)]
pub struct FontLibrary {
    #[cfg(feature = "system-fonts")]
    db: fontdb::Database,

    providers: Vec<Arc<dyn FontProvider>>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("FontLibrary");
        s.field(
            "providers",
            &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
        );
        #[cfg(feature = "system-fonts")]
        s.field("fontdb_faces", &self.db.len());
        s.finish()
    }
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a font provider. Providers are consulted before system fonts.
    pub fn with_provider(mut self, provider: Arc<dyn FontProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Enables system font loading (native platforms only).
    #[cfg(feature = "system-fonts")]
    pub fn with_system_fonts(mut self, enable: bool) -> Self {
        if enable {
            self.db.load_system_fonts();
            log::debug!("Loaded {} system font faces", self.db.len());
        }
        self
    }

    #[cfg(not(feature = "system-fonts"))]
    pub fn with_system_fonts(self, enable: bool) -> Self {
        if enable {
            log::warn!("System fonts requested but the `system-fonts` feature is disabled");
        }
        self
    }

    /// Adds fonts from a directory.
    #[cfg(feature = "system-fonts")]
    pub fn add_font_dir<P: AsRef<std::path::Path>>(&mut self, path: P) {
        let before = self.db.len();
        self.db.load_fonts_dir(path.as_ref());
        log::debug!(
            "Loaded {} font faces from {}",
            self.db.len() - before,
            path.as_ref().display()
        );
    }

    #[cfg(not(feature = "system-fonts"))]
    pub fn add_font_dir<P: AsRef<std::path::Path>>(&mut self, path: P) {
        log::warn!(
            "Ignoring font directory {}: the `system-fonts` feature is disabled",
            path.as_ref().display()
        );
    }

    /// Resolves every supported family.
    pub fn resolve_all(&self) -> FontSet {
        let mut set = FontSet::standard_only();
        for family in FontFamily::ALL {
            set.insert(family, self.resolve(family));
        }
        set
    }

    /// Resolves one family, falling back to base-14 when no source has it.
    pub fn resolve(&self, family: FontFamily) -> ResolvedFont {
        let candidates = family_candidates(family);
        log::debug!("Resolving font family '{}'", family);

        if let Some(font) = self.resolve_from_providers(family, candidates) {
            return font;
        }

        #[cfg(feature = "system-fonts")]
        {
            if let Some(font) = self.resolve_from_fontdb(candidates) {
                return font;
            }
        }

        let fallback = standard_fallback(family);
        log::warn!(
            "No font installed for '{}', falling back to {}",
            family,
            fallback.base_font()
        );
        ResolvedFont::Standard(fallback)
    }

    fn resolve_from_providers(
        &self,
        family: FontFamily,
        candidates: &[&str],
    ) -> Option<ResolvedFont> {
        let (primary, substitutes) = candidates.split_first()?;
        let query = FontQuery::new(primary).with_fallbacks(substitutes);
        for provider in &self.providers {
            match provider.load_font(&query) {
                Ok((descriptor, data)) => {
                    match EmbeddedFont::from_data(&descriptor.family, data, descriptor.face_index) {
                        Ok(font) => {
                            log::debug!(
                                "  → '{}' found via {} as '{}'",
                                family,
                                provider.name(),
                                descriptor.family
                            );
                            return Some(ResolvedFont::Embedded(Arc::new(font)));
                        }
                        Err(e) => log::warn!("  → Unusable font from {}: {}", provider.name(), e),
                    }
                }
                Err(FontError::NotFound { .. }) => {}
                Err(e) => log::warn!("  → {} failed: {}", provider.name(), e),
            }
        }
        None
    }

    #[cfg(feature = "system-fonts")]
    fn resolve_from_fontdb(&self, candidates: &[&str]) -> Option<ResolvedFont> {
        for name in candidates {
            let query = fontdb::Query {
                families: &[fontdb::Family::Name(name)],
                weight: fontdb::Weight::NORMAL,
                stretch: fontdb::Stretch::Normal,
                style: fontdb::Style::Normal,
            };
            let Some(id) = self.db.query(&query) else {
                continue;
            };
            let loaded = self
                .db
                .with_face_data(id, |data, index| (data.to_vec(), index));
            let Some((bytes, index)) = loaded else {
                log::warn!("  → fontdb listed '{}' but its data could not be read", name);
                continue;
            };
            match EmbeddedFont::from_data(name, Arc::new(bytes), index) {
                Ok(font) => {
                    log::debug!("  → Found '{}' in fontdb", name);
                    return Some(ResolvedFont::Embedded(Arc::new(font)));
                }
                Err(e) => log::warn!("  → Unusable system font '{}': {}", name, e),
            }
        }
        None
    }
}
