use crate::error::BatchError;
use inscribe_pdf_composer::{SplitPage, split_pages};
use inscribe_placement::LayoutSet;
use inscribe_types::PageBox;
use log::info;
use std::fs;
use std::path::Path;

/// One page of the template as a standalone single-page PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePage {
    /// 1-based page number.
    pub number: u32,
    pub bytes: Vec<u8>,
    pub page_box: PageBox,
}

impl From<SplitPage> for TemplatePage {
    fn from(page: SplitPage) -> Self {
        Self {
            number: page.number,
            bytes: page.bytes,
            page_box: page.page_box,
        }
    }
}

/// A decoded multi-page template, read-only for the duration of a batch.
#[derive(Debug, Clone)]
pub struct Template {
    pages: Vec<TemplatePage>,
}

impl Template {
    /// Decodes a PDF and splits it into standalone pages.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BatchError> {
        let pages: Vec<TemplatePage> = split_pages(bytes)?
            .into_iter()
            .map(TemplatePage::from)
            .collect();
        info!("Loaded template with {} pages", pages.len());
        Ok(Self { pages })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[TemplatePage] {
        &self.pages
    }

    /// The page with the given 1-based number.
    pub fn page(&self, number: u32) -> Option<&TemplatePage> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.pages.get(index)
    }

    /// Page dimensions in PDF points.
    pub fn page_box(&self, number: u32) -> Option<PageBox> {
        self.page(number).map(|page| page.page_box)
    }

    /// One default layout per page.
    pub fn default_layouts(&self) -> LayoutSet {
        LayoutSet::defaults(self.pages.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::template_pdf;

    #[test]
    fn pages_are_numbered_from_one() {
        let template = Template::from_bytes(&template_pdf(&["cover", "inside", "back"])).unwrap();
        assert_eq!(template.page_count(), 3);
        assert_eq!(template.page(1).unwrap().number, 1);
        assert_eq!(template.page(3).unwrap().number, 3);
        assert!(template.page(0).is_none());
        assert!(template.page(4).is_none());
    }

    #[test]
    fn page_box_comes_from_the_page() {
        let template = Template::from_bytes(&template_pdf(&["only"])).unwrap();
        let page_box = template.page_box(1).unwrap();
        assert_eq!(page_box.width(), 612.0);
        assert_eq!(page_box.height(), 792.0);
    }

    #[test]
    fn default_layouts_cover_every_page() {
        let template = Template::from_bytes(&template_pdf(&["a", "b"])).unwrap();
        let layouts = template.default_layouts();
        assert_eq!(layouts.len(), 2);
        assert_eq!(layouts.enabled_count(), 2);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = Template::from_bytes(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, BatchError::Template(_)));
    }
}
