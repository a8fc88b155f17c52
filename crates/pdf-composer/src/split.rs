use crate::page::{extract_page, flatten_inherited, page_box, save_document};
use crate::ComposerError;
use inscribe_types::PageBox;
use log::debug;
use lopdf::{Document, Object, ObjectId};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// One page of a source document as a standalone PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPage {
    /// 1-based position in the source document.
    pub number: u32,
    pub bytes: Vec<u8>,
    pub page_box: PageBox,
}

/// The owned parts of an extracted page document. Serialization happens on
/// the rayon pool, so only plain objects cross threads.
struct PageParts {
    number: u32,
    page_box: PageBox,
    version: String,
    objects: BTreeMap<ObjectId, Object>,
    max_id: u32,
    root: ObjectId,
}

impl PageParts {
    fn take(number: u32, page_box: PageBox, doc: Document) -> Result<Self, ComposerError> {
        let root = doc.trailer.get(b"Root")?.as_reference()?;
        Ok(Self {
            number,
            page_box,
            version: doc.version,
            objects: doc.objects,
            max_id: doc.max_id,
            root,
        })
    }

    fn into_split_page(self) -> Result<SplitPage, ComposerError> {
        let mut doc = Document::with_version(self.version);
        doc.objects = self.objects;
        doc.max_id = self.max_id;
        doc.trailer.set("Root", self.root);
        let bytes = save_document(&mut doc)?;
        Ok(SplitPage {
            number: self.number,
            bytes,
            page_box: self.page_box,
        })
    }
}

/// Splits a PDF into one standalone document per page, in page order.
pub fn split_pages(bytes: &[u8]) -> Result<Vec<SplitPage>, ComposerError> {
    let mut source = Document::load_mem(bytes)?;
    let pages = source.get_pages();
    if pages.is_empty() {
        return Err(ComposerError::NoPages);
    }

    let mut parts = Vec::with_capacity(pages.len());
    for (&number, &page_id) in &pages {
        flatten_inherited(&mut source, page_id)?;
        let page_box = page_box(&source, page_id);
        let single = extract_page(&source, number)?;
        parts.push(PageParts::take(number, page_box, single)?);
    }
    debug!("Extracted {} pages, serializing", parts.len());

    parts
        .into_par_iter()
        .map(PageParts::into_split_page)
        .collect()
}
