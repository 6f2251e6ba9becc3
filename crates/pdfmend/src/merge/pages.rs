//! Page tree surgery for merging.
//!
//! Pages from one document are grafted directly under the root `Pages` node
//! of another. Attributes a page inherits from its old ancestors would be
//! lost (or, worse, picked up from the new root), so every page is made
//! self-contained before it moves.

use ::lopdf::{Dictionary, Document, Object, ObjectId};

use crate::backend::lopdf::inherited_attribute;
use crate::error::{PdfMendError, Result};

/// Attributes a page may inherit from the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// US Letter, used for pages without any media box.
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// Copy inherited attributes onto every page and return the page ids in
/// page order.
///
/// Pages end up with an explicit `MediaBox`, `Resources` and `Rotate`;
/// `CropBox` is copied only when one is inherited.
pub(crate) fn detach_pages(document: &mut Document) -> Result<Vec<ObjectId>> {
    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();

    for &page_id in &page_ids {
        let missing: Vec<(&[u8], Object)> = {
            let page = document.get_dictionary(page_id)?;
            INHERITABLE
                .into_iter()
                .filter(|key| !page.has(key))
                .filter_map(|key| {
                    inherited_attribute(document, page_id, key)
                        .cloned()
                        .or_else(|| default_attribute(key))
                        .map(|value| (key, value))
                })
                .collect()
        };

        if missing.is_empty() {
            continue;
        }

        let page = document
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)?;
        for (key, value) in missing {
            page.set(key, value);
        }
    }

    Ok(page_ids)
}

fn default_attribute(key: &[u8]) -> Option<Object> {
    match key {
        b"MediaBox" => Some(Object::Array(
            DEFAULT_MEDIA_BOX.iter().map(|&v| Object::Integer(v)).collect(),
        )),
        b"Resources" => Some(Object::Dictionary(Dictionary::new())),
        b"Rotate" => Some(Object::Integer(0)),
        _ => None,
    }
}

/// Object id of the root `Pages` node.
pub(crate) fn root_pages_id(document: &Document) -> Result<ObjectId> {
    document
        .catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| PdfMendError::merge_failed(format!("Failed to get pages reference: {e}")))
}

/// Append `page_ids` to the root page tree node of `document`.
///
/// Each page's `Parent` is pointed at the root node and the root `Count`
/// grows by the number of pages added.
pub(crate) fn add_pages_to_tree(document: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    let pages_id = root_pages_id(document)?;

    for &page_id in page_ids {
        document
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfMendError::merge_failed(format!("Failed to get page object: {e}")))?
            .set("Parent", Object::Reference(pages_id));
    }

    let pages = document
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfMendError::merge_failed(format!("Failed to get pages object: {e}")))?;

    match pages.get_mut(b"Kids") {
        Ok(Object::Array(kids)) => {
            kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));
        }
        Ok(_) => return Err(PdfMendError::merge_failed("Kids is not an array")),
        Err(_) => {
            return Err(PdfMendError::merge_failed(
                "Pages dictionary missing Kids array",
            ));
        }
    }

    let current_count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    pages.set(
        "Count",
        Object::Integer(current_count + page_ids.len() as i64),
    );

    Ok(())
}
