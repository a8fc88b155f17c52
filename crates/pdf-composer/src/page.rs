use crate::{ComposerError, ObjectCopier};
use inscribe_types::{PageBox, PageView, Rotation};
use lopdf::{Document, Object, ObjectId, dictionary};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

const MAX_TREE_DEPTH: usize = 32;

fn parent_of(doc: &Document, node: ObjectId) -> Option<ObjectId> {
    doc.get_object(node)
        .and_then(Object::as_dict)
        .and_then(|dict| dict.get(b"Parent"))
        .and_then(Object::as_reference)
        .ok()
}

/// Looks up `key` on the page or the nearest ancestor carrying it.
pub(crate) fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = Some(page_id);
    for _ in 0..MAX_TREE_DEPTH {
        let id = node?;
        if let Ok(value) = doc.get_object(id).and_then(Object::as_dict).and_then(|d| d.get(key)) {
            return Some(value.clone());
        }
        node = parent_of(doc, id);
    }
    None
}

/// Copies inheritable attributes found on ancestors onto the page itself,
/// so the page renders the same once detached from its tree.
pub fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> Result<(), ComposerError> {
    let mut pinned = Vec::new();
    {
        let dict = doc.get_object(page_id)?.as_dict()?;
        for key in INHERITABLE {
            if dict.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(doc, page_id, key) {
                pinned.push((key, value));
            }
        }
    }
    let dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    for (key, value) in pinned {
        dict.set(key.to_vec(), value);
    }
    Ok(())
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn read_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Vec<f32>> {
    let value = inherited_attribute(doc, page_id, key)?;
    let array = match &value {
        Object::Array(arr) => Some(arr),
        Object::Reference(id) => doc.get_object(*id).and_then(Object::as_array).ok(),
        _ => None,
    };
    Some(
        array
            .map(|arr| arr.iter().filter_map(number).collect())
            .unwrap_or_default(),
    )
}

fn usable(values: &[f32]) -> Option<PageBox> {
    match values {
        [x0, y0, x1, y1] if x0 != x1 && y0 != y1 => Some(PageBox::new(*x0, *y0, *x1, *y1)),
        _ => None,
    }
}

/// The page's `MediaBox` in points, inherited if needed. Pages with a
/// missing or malformed box report US Letter.
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let Some(values) = read_box(doc, page_id, b"MediaBox") else {
        return PageBox::LETTER;
    };
    usable(&values).unwrap_or_else(|| {
        log::warn!("Page {:?} has an unusable MediaBox, assuming US Letter", page_id);
        PageBox::LETTER
    })
}

/// The region a viewer shows: the `CropBox` clipped to the `MediaBox`, or the
/// `MediaBox` when there is no usable crop.
pub fn visible_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let media = page_box(doc, page_id);
    let Some(crop) = read_box(doc, page_id, b"CropBox").as_deref().and_then(usable) else {
        return media;
    };
    let clipped = [
        crop.x0.max(media.x0),
        crop.y0.max(media.y0),
        crop.x1.min(media.x1),
        crop.y1.min(media.y1),
    ];
    if clipped[0] < clipped[2] && clipped[1] < clipped[3] {
        PageBox::new(clipped[0], clipped[1], clipped[2], clipped[3])
    } else {
        log::warn!("Page {:?} has a CropBox outside its MediaBox, ignoring it", page_id);
        media
    }
}

/// Display rotation from the page's `/Rotate`, inherited if needed.
pub fn page_rotation(doc: &Document, page_id: ObjectId) -> Rotation {
    let degrees = match inherited_attribute(doc, page_id, b"Rotate") {
        Some(Object::Integer(degrees)) => degrees,
        Some(Object::Real(degrees)) => degrees.round() as i64,
        Some(Object::Reference(id)) => doc.get_object(id).and_then(Object::as_i64).unwrap_or(0),
        _ => 0,
    };
    if degrees % 90 != 0 {
        log::warn!("Page {:?} has /Rotate {}, treating it as 0", page_id, degrees);
    }
    Rotation::from_degrees(degrees)
}

/// The page as a viewer displays it.
pub fn page_view(doc: &Document, page_id: ObjectId) -> PageView {
    PageView::new(visible_box(doc, page_id), page_rotation(doc, page_id))
}

pub fn first_page_id(doc: &Document) -> Result<ObjectId, ComposerError> {
    doc.get_pages()
        .into_values()
        .next()
        .ok_or(ComposerError::NoPages)
}

/// Builds a standalone single-page document from one page of `doc`.
///
/// The page keeps everything it references. Other pages, the original page
/// tree and catalog-level navigation (outlines, named destinations, open
/// action, structure tree) are left behind.
pub fn extract_page(doc: &Document, page_number: u32) -> Result<Document, ComposerError> {
    let page_id = *doc
        .get_pages()
        .get(&page_number)
        .ok_or(ComposerError::PageNotFound(page_number))?;

    let mut single = Document::with_version(doc.version.clone());
    let pages_id = single.new_object_id();

    let new_page_id = ObjectCopier::new(doc, &mut single)
        .excluding_page_tree()
        .copy_page(page_id, pages_id)?;

    single.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(new_page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = single.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    single.trailer.set("Root", catalog_id);
    Ok(single)
}

/// Serializes a document to bytes.
pub fn save_document(doc: &mut Document) -> Result<Vec<u8>, ComposerError> {
    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}
