use crate::content::{encode, name_operations};
use crate::fonts::{FontPrograms, write_font};
use inscribe_layout::{BlockStyle, FontSet, ResolvedFont, layout_block};
use inscribe_pdf_composer::{
    add_font_resource, first_page_id, overlay_content, page_view, save_document,
};
use inscribe_placement::PageLayout;
use inscribe_render_core::{PageRenderer, RenderError};
use inscribe_roster::NameEntry;
use log::debug;
use lopdf::Document;
use std::sync::Arc;

/// Per-job memory budget used when none is configured: 256 MiB.
pub const DEFAULT_MEMORY_BUDGET: usize = 256 * 1024 * 1024;

/// A parsed page takes several times its serialized size in memory.
const PARSE_FACTOR: usize = 8;

/// Renders names onto template pages with lopdf.
///
/// One instance serves every job of a batch. Font programs are compressed
/// on first use and shared by later jobs.
#[derive(Debug, Clone)]
pub struct LopdfPageRenderer {
    fonts: Arc<FontSet>,
    programs: Arc<FontPrograms>,
    memory_budget: usize,
}

impl Default for LopdfPageRenderer {
    fn default() -> Self {
        Self::new(Arc::new(FontSet::standard_only()))
    }
}

impl LopdfPageRenderer {
    pub fn new(fonts: Arc<FontSet>) -> Self {
        Self {
            fonts,
            programs: Arc::new(FontPrograms::default()),
            memory_budget: DEFAULT_MEMORY_BUDGET,
        }
    }

    pub fn with_memory_budget(mut self, bytes: usize) -> Self {
        self.memory_budget = bytes;
        self
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Rough working set of one job: the parsed page, the embedded font and
    /// the serialized output holding both.
    fn estimate_memory(template_len: usize, font: &ResolvedFont) -> usize {
        let font_bytes = font.embedded_size();
        template_len
            .saturating_mul(PARSE_FACTOR)
            .saturating_add(font_bytes.saturating_mul(2))
            .saturating_add(template_len)
    }

    fn check_budget(&self, template_len: usize, font: &ResolvedFont) -> Result<(), RenderError> {
        let required = Self::estimate_memory(template_len, font);
        if required > self.memory_budget {
            return Err(RenderError::OutOfMemory {
                required,
                budget: self.memory_budget,
            });
        }
        Ok(())
    }
}

impl PageRenderer for LopdfPageRenderer {
    fn render(
        &self,
        template_page: &[u8],
        layout: &PageLayout,
        name: &NameEntry,
    ) -> Result<Vec<u8>, RenderError> {
        if !layout.enabled {
            return Ok(template_page.to_vec());
        }

        let font = self.fonts.get(layout.font_family);
        self.check_budget(template_page.len(), &font)?;

        let mut doc = Document::load_mem(template_page)?;
        let page_id = first_page_id(&doc)?;
        let view = page_view(&doc, page_id);
        let (frame, transform) = view.layout_frame();
        let anchor = frame.point_at_percent(layout.position.x, layout.position.y);

        let style = BlockStyle {
            font_size: layout.font_size,
            line_spacing: layout.line_spacing,
            alignment: layout.alignment,
        };
        let block = layout_block(
            &font,
            layout.font_family.display_name(),
            name.display_lines(),
            anchor,
            &style,
        )?;

        let font_id = write_font(&mut doc, &font, &block, &self.programs)?;
        let font_name = add_font_resource(&mut doc, page_id, font_id)?;
        let stream = encode(name_operations(
            &block,
            &font_name,
            layout.font_color,
            transform,
        ))?;
        overlay_content(&mut doc, page_id, stream)?;

        debug!(
            "Rendered '{}' on page {} with {} at ({:.1}, {:.1}), rotated {}",
            name.output_id(),
            layout.page_number,
            font.describe(),
            anchor.x,
            anchor.y,
            view.rotation.degrees()
        );
        Ok(save_document(&mut doc)?)
    }

    fn name(&self) -> &'static str {
        "lopdf"
    }
}
