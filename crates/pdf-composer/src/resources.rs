use crate::ComposerError;
use crate::page::inherited_attribute;
use lopdf::{Dictionary, Document, Object, ObjectId};

const FONT_NAME_PREFIX: &str = "FIns";

fn resolve_dict(doc: &Document, obj: &Object) -> Result<Dictionary, ComposerError> {
    match obj {
        Object::Dictionary(dict) => Ok(dict.clone()),
        Object::Reference(id) => Ok(doc.get_object(*id)?.as_dict()?.clone()),
        other => Err(ComposerError::MalformedResources(format!(
            "expected a dictionary, found {other:?}"
        ))),
    }
}

fn unused_name(fonts: &Dictionary) -> String {
    let mut name = FONT_NAME_PREFIX.to_string();
    let mut suffix = 0;
    while fonts.has(name.as_bytes()) {
        suffix += 1;
        name = format!("{FONT_NAME_PREFIX}{suffix}");
    }
    name
}

/// Registers `font_id` in the page's font resources and returns the
/// resource name to use with `Tf`.
///
/// The page gets its own copy of its `Resources` (inherited ones included)
/// and `Font` dictionaries, so objects shared with other pages are never
/// modified. Existing font names are left untouched.
pub fn add_font_resource(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<String, ComposerError> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(obj) => resolve_dict(doc, &obj)?,
        None => Dictionary::new(),
    };
    let mut fonts = match resources.get(b"Font") {
        Ok(obj) => resolve_dict(doc, obj)?,
        Err(_) => Dictionary::new(),
    };

    let name = unused_name(&fonts);
    fonts.set(name.as_bytes().to_vec(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", Object::Dictionary(resources));
    Ok(name)
}
