//! PDF composition utilities for splitting, personalizing and reassembling
//! PDF documents.
//!
//! This crate provides low-level PDF manipulation using lopdf:
//! - Deep object copying with cycle detection
//! - Page extraction into standalone single-page documents
//! - Content overlaying and page-local font resources
//! - Reassembly of single-page documents into one PDF, sharing identical
//!   font programs between pages

mod dedupe;
mod error;
mod page;
mod resources;
mod split;

pub use dedupe::share_font_programs;
pub use error::ComposerError;
pub use page::{
    extract_page, first_page_id, flatten_inherited, page_box, page_rotation, page_view,
    save_document, visible_box,
};
pub use resources::add_font_resource;
pub use split::{SplitPage, split_pages};

use log::debug;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::collections::{HashMap, HashSet};

/// Copies objects from one document into another under fresh ids, following
/// references and copying each source object at most once.
pub(crate) struct ObjectCopier<'a> {
    source_doc: &'a Document,
    target_doc: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
    /// Source objects that must not be followed; references to them become null.
    excluded: HashSet<ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    pub(crate) fn new(source_doc: &'a Document, target_doc: &'a mut Document) -> Self {
        Self {
            source_doc,
            target_doc,
            id_map: HashMap::new(),
            excluded: HashSet::new(),
        }
    }

    /// Stops the copy at the source's page tree so copying one page does not
    /// drag its siblings along through `Parent` or annotation links.
    pub(crate) fn excluding_page_tree(mut self) -> Self {
        self.excluded = page_tree_nodes(self.source_doc);
        self
    }

    /// Copies a page dictionary and everything it references, attaching the
    /// copy to `parent` in the target document.
    pub(crate) fn copy_page(
        &mut self,
        page_id: ObjectId,
        parent: ObjectId,
    ) -> Result<ObjectId, lopdf::Error> {
        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(page_id, new_id);

        let mut dict = self.source_doc.get_object(page_id)?.as_dict()?.clone();
        dict.remove(b"Parent");
        let mut page = self.remap_references(Object::Dictionary(dict))?;
        if let Object::Dictionary(dict) = &mut page {
            dict.set("Parent", Object::Reference(parent));
        }

        match self.target_doc.objects.get_mut(&new_id) {
            Some(target_obj) => *target_obj = page,
            None => return Err(lopdf::Error::ObjectNotFound(new_id)),
        }
        Ok(new_id)
    }

    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Register the new id before recursing so reference cycles terminate.
        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source_doc.get_object(source_id)?.clone();
        let new_obj = self.remap_references(obj)?;

        match self.target_doc.objects.get_mut(&new_id) {
            Some(target_obj) => *target_obj = new_obj,
            None => return Err(lopdf::Error::ObjectNotFound(new_id)),
        }

        Ok(new_id)
    }

    /// Rewrites every reference inside `obj` to point into the target.
    fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => {
                if let Some(target_id) = self.id_map.get(&id) {
                    return Ok(Object::Reference(*target_id));
                }
                if self.excluded.contains(&id) {
                    return Ok(Object::Null);
                }
                let new_id = self.copy_object(id)?;
                Ok(Object::Reference(new_id))
            }
            Object::Array(arr) => {
                let new_arr = arr
                    .into_iter()
                    .map(|o| self.remap_references(o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(new_arr))
            }
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }
}

/// Every `Page` and `Pages` node reachable from the document's pages.
fn page_tree_nodes(doc: &Document) -> HashSet<ObjectId> {
    let mut nodes = HashSet::new();
    for page_id in doc.get_pages().into_values() {
        let mut current = Some(page_id);
        let mut depth = 0;
        while let Some(id) = current {
            if !nodes.insert(id) || depth > 64 {
                break;
            }
            depth += 1;
            current = doc
                .get_object(id)
                .and_then(Object::as_dict)
                .and_then(|dict| dict.get(b"Parent"))
                .and_then(Object::as_reference)
                .ok();
        }
    }
    nodes
}

pub(crate) fn pages_root(doc: &Document) -> Result<ObjectId, ComposerError> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    Ok(doc.get_object(root_id)?.as_dict()?.get(b"Pages")?.as_reference()?)
}

/// Appends every page of `source` to the end of `target`'s page tree and
/// returns how many pages were added.
///
/// Each page travels with the objects it depends on (resources, content
/// streams, fonts) under fresh ids, with inherited attributes pinned onto
/// it first. The source's page tree and catalog stay behind.
pub fn append_pages(target: &mut Document, mut source: Document) -> Result<usize, ComposerError> {
    let source_pages = source.get_pages();
    for page_id in source_pages.values() {
        flatten_inherited(&mut source, *page_id)?;
    }

    let pages_id = pages_root(target)?;
    let mut copier = ObjectCopier::new(&source, target).excluding_page_tree();
    let copied = source_pages
        .values()
        .map(|&page_id| copier.copy_page(page_id, pages_id).map(Object::Reference))
        .collect::<Result<Vec<_>, _>>()?;
    let added = copied.len();

    let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;
    let count = pages_dict.get(b"Count")?.as_i64()?;
    let mut kids = pages_dict.get(b"Kids")?.as_array()?.clone();
    kids.extend(copied);
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", count + added as i64);

    Ok(added)
}

/// Concatenates single- or multi-page PDFs, in order, into one PDF.
pub fn concat_pages<B: AsRef<[u8]>>(pages: &[B]) -> Result<Vec<u8>, ComposerError> {
    let (first, rest) = pages.split_first().ok_or(ComposerError::NoPages)?;
    let mut target = Document::load_mem(first.as_ref())?;
    for bytes in rest {
        let source = Document::load_mem(bytes.as_ref())?;
        append_pages(&mut target, source)?;
    }
    let shared = share_font_programs(&mut target);
    let pruned = target.prune_objects();
    debug!(
        "Concatenated {} page documents, shared {} font programs, pruned {} objects",
        pages.len(),
        shared,
        pruned.len()
    );
    target.renumber_objects();
    save_document(&mut target)
}

/// Draws a new content stream on top of an existing page.
///
/// The page's existing content is bracketed by its own `q`/`Q` pair so any
/// graphics state it leaves behind cannot leak into the overlay.
///
/// # Arguments
/// * `doc` - The document containing the page to modify.
/// * `page_id` - The `ObjectId` of the page to add the overlay to.
/// * `content_stream` - The raw bytes of the new content stream.
pub fn overlay_content(
    doc: &mut Document,
    page_id: ObjectId,
    content_stream: Vec<u8>,
) -> Result<(), ComposerError> {
    let new_content_id = doc.add_object(Stream::new(dictionary! {}, content_stream));

    let existing = doc
        .get_object(page_id)?
        .as_dict()?
        .get(b"Contents")
        .ok()
        .cloned();

    let contents = match existing {
        Some(existing) => {
            let mut streams = match existing {
                Object::Array(arr) => arr,
                other => vec![other],
            };
            let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
            let restore_id = doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));
            streams.insert(0, Object::Reference(save_id));
            streams.push(Object::Reference(restore_id));
            streams.push(Object::Reference(new_content_id));
            Object::Array(streams)
        }
        None => Object::Reference(new_content_id),
    };

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", contents);
    Ok(())
}
