use super::config::BatchConfig;
use super::orchestrator::BatchOrchestrator;
use crate::error::BatchError;
use inscribe_layout::{EmbeddedFont, FontLibrary};
use inscribe_render_core::PageRenderer;
use inscribe_render_lopdf::LopdfPageRenderer;
use inscribe_traits::{FontProvider, InMemoryFontProvider};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// A builder for creating a [`BatchOrchestrator`].
///
/// Fonts are resolved once in [`build`](Self::build); the resulting font set
/// is shared read-only by every job.
#[derive(Default)]
pub struct BatchBuilder {
    config: BatchConfig,
    in_memory_fonts: Option<Arc<InMemoryFontProvider>>,
    providers: Vec<Arc<dyn FontProvider>>,
    renderer: Option<Arc<dyn PageRenderer>>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Maximum number of render jobs in flight.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Per-job memory budget in bytes.
    pub fn with_memory_budget(mut self, bytes: usize) -> Self {
        self.config.job_memory_budget = bytes;
        self
    }

    /// Whether installed system fonts are searched.
    pub fn with_system_fonts(mut self, enable: bool) -> Self {
        self.config.system_fonts = enable;
        self
    }

    /// Scans a directory for font files (`.ttf`, `.otf`, etc.).
    pub fn with_font_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.font_dirs.push(path.into());
        self
    }

    /// Registers font bytes for a family name. These take precedence over
    /// system fonts. Fails if the bytes are not a TrueType/OpenType font.
    pub fn with_font_data(
        mut self,
        family: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Self, BatchError> {
        let family = family.into();
        let data = Arc::new(data);
        EmbeddedFont::from_data(&family, Arc::clone(&data), 0)?;
        let provider = self
            .in_memory_fonts
            .get_or_insert_with(|| Arc::new(InMemoryFontProvider::new()));
        provider.add_font_shared(family, data)?;
        Ok(self)
    }

    pub fn with_font_provider(mut self, provider: Arc<dyn FontProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Uses a custom renderer instead of the lopdf one. Font settings are
    /// then ignored.
    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    fn font_library(&self) -> FontLibrary {
        let mut library = FontLibrary::new().with_system_fonts(self.config.system_fonts);
        for dir in &self.config.font_dirs {
            library.add_font_dir(dir);
        }
        if let Some(fonts) = &self.in_memory_fonts {
            library = library.with_provider(Arc::clone(fonts) as Arc<dyn FontProvider>);
        }
        for provider in &self.providers {
            library = library.with_provider(Arc::clone(provider));
        }
        library
    }

    /// Resolves fonts and creates the orchestrator.
    pub fn build(self) -> Result<BatchOrchestrator, BatchError> {
        if self.config.concurrency == 0 {
            return Err(BatchError::Config("concurrency must be at least 1".into()));
        }

        let renderer: Arc<dyn PageRenderer> = match &self.renderer {
            Some(renderer) => Arc::clone(renderer),
            None => {
                let fonts = self.font_library().resolve_all();
                Arc::new(
                    LopdfPageRenderer::new(Arc::new(fonts))
                        .with_memory_budget(self.config.job_memory_budget),
                )
            }
        };
        info!(
            "Built batch orchestrator with {} renderer, concurrency {}",
            renderer.name(),
            self.config.concurrency
        );
        Ok(BatchOrchestrator::new(renderer, self.config))
    }
}
