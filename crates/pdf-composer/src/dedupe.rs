use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;

const FONT_FILE_KEYS: [&[u8]; 3] = [b"FontFile", b"FontFile2", b"FontFile3"];

fn is_font_descriptor(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"FontDescriptor")
}

fn same_program(doc: &Document, a: ObjectId, b: ObjectId) -> bool {
    let stream = |id: ObjectId| doc.get_object(id).and_then(Object::as_stream);
    match (stream(a), stream(b)) {
        (Ok(a), Ok(b)) => a.dict == b.dict && a.content == b.content,
        _ => false,
    }
}

/// Points every font descriptor at a single copy of each distinct embedded
/// font program and returns how many copies became unreferenced. Those
/// copies stay in the document until it is pruned.
pub fn share_font_programs(doc: &mut Document) -> usize {
    let mut distinct: Vec<ObjectId> = Vec::new();
    let mut shared: HashMap<ObjectId, ObjectId> = HashMap::new();
    let mut relinks: Vec<(ObjectId, &'static [u8], ObjectId)> = Vec::new();

    for (&id, object) in &doc.objects {
        if !is_font_descriptor(object) {
            continue;
        }
        let Ok(dict) = object.as_dict() else {
            continue;
        };
        for key in FONT_FILE_KEYS {
            let Ok(program) = dict.get(key).and_then(Object::as_reference) else {
                continue;
            };
            let target = match shared.get(&program) {
                Some(&target) => target,
                None => {
                    let target = distinct
                        .iter()
                        .copied()
                        .find(|&candidate| same_program(doc, candidate, program))
                        .unwrap_or(program);
                    if target == program {
                        distinct.push(program);
                    }
                    shared.insert(program, target);
                    target
                }
            };
            if target != program {
                relinks.push((id, key, target));
            }
        }
    }

    for &(descriptor, key, target) in &relinks {
        if let Ok(dict) = doc.get_object_mut(descriptor).and_then(Object::as_dict_mut) {
            dict.set(key.to_vec(), Object::Reference(target));
        }
    }
    shared.iter().filter(|(program, target)| program != target).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    fn add_font(doc: &mut Document, program: &[u8]) -> ObjectId {
        let file = doc.add_object(Stream::new(
            dictionary! { "Length1" => program.len() as i64 },
            program.to_vec(),
        ));
        doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => "Mono",
            "FontFile2" => file,
        })
    }

    fn program_of(doc: &Document, descriptor: ObjectId) -> ObjectId {
        doc.get_object(descriptor)
            .and_then(Object::as_dict)
            .and_then(|dict| dict.get(b"FontFile2"))
            .and_then(Object::as_reference)
            .unwrap()
    }

    #[test]
    fn identical_programs_are_shared() {
        let mut doc = Document::with_version("1.7");
        let first = add_font(&mut doc, b"glyf table");
        let second = add_font(&mut doc, b"glyf table");
        let other = add_font(&mut doc, b"another face");

        assert_eq!(share_font_programs(&mut doc), 1);
        assert_eq!(program_of(&doc, first), program_of(&doc, second));
        assert_ne!(program_of(&doc, first), program_of(&doc, other));
    }

    #[test]
    fn sharing_twice_changes_nothing() {
        let mut doc = Document::with_version("1.7");
        add_font(&mut doc, b"glyf table");
        add_font(&mut doc, b"glyf table");
        share_font_programs(&mut doc);
        assert_eq!(share_font_programs(&mut doc), 0);
    }
}
