use lopdf::{Dictionary, Document as LopdfDocument, Object};

/// Decoded content of a 1-based page, all content streams concatenated.
pub fn page_content(doc: &LopdfDocument, page_number: u32) -> String {
    let page_id = *doc
        .get_pages()
        .get(&page_number)
        .unwrap_or_else(|| panic!("page {page_number} missing"));
    let content = doc.get_page_content(page_id).expect("page content");
    String::from_utf8_lossy(&content).into_owned()
}

fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        other => other.as_dict().ok(),
    }
}

/// Font dictionaries in the resources of a 1-based page, looking up the page
/// tree for inherited resources.
pub fn page_fonts(doc: &LopdfDocument, page_number: u32) -> Vec<&Dictionary> {
    let Some(&page_id) = doc.get_pages().get(&page_number) else {
        return Vec::new();
    };

    let mut node = doc.get_object(page_id).ok().and_then(|o| o.as_dict().ok());
    let mut resources = None;
    while let Some(dict) = node {
        if let Ok(res) = dict.get(b"Resources") {
            resources = resolve_dict(doc, res);
            break;
        }
        node = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| resolve_dict(doc, p));
    }

    let Some(fonts) = resources
        .and_then(|res| res.get(b"Font").ok())
        .and_then(|f| resolve_dict(doc, f))
    else {
        return Vec::new();
    };
    fonts
        .iter()
        .filter_map(|(_, font)| resolve_dict(doc, font))
        .collect()
}

/// `BaseFont` names of a page's fonts, sorted.
pub fn page_font_names(doc: &LopdfDocument, page_number: u32) -> Vec<String> {
    let mut names: Vec<String> = page_fonts(doc, page_number)
        .into_iter()
        .filter_map(|font| font.get(b"BaseFont").ok()?.as_name().ok())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();
    names.sort();
    names
}

/// Follows `key` in `dict` to the dictionary it references.
pub fn dict_at<'a>(doc: &'a LopdfDocument, dict: &'a Dictionary, key: &[u8]) -> &'a Dictionary {
    let value = dict
        .get(key)
        .unwrap_or_else(|_| panic!("missing /{}", String::from_utf8_lossy(key)));
    resolve_dict(doc, value)
        .unwrap_or_else(|| panic!("/{} is not a dictionary", String::from_utf8_lossy(key)))
}

pub fn name_of<'a>(dict: &'a Dictionary, key: &[u8]) -> &'a [u8] {
    dict.get(key).and_then(Object::as_name).unwrap_or_default()
}

/// Asserts that a page draws `text` with a literal `Tj` string.
pub fn assert_draws_text(doc: &LopdfDocument, page_number: u32, text: &str) {
    let content = page_content(doc, page_number);
    let needle = format!("({text}) Tj");
    assert!(
        content.contains(&needle),
        "page {page_number} does not draw {text:?}:\n{content}"
    );
}

pub fn assert_no_text(doc: &LopdfDocument, page_number: u32, text: &str) {
    let content = page_content(doc, page_number);
    assert!(
        !content.contains(&format!("({text})")),
        "page {page_number} unexpectedly draws {text:?}"
    );
}
