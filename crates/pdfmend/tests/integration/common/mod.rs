//! Shared helpers for the integration tests.
//!
//! PDFs are built in memory with `lopdf` and written into a temporary
//! directory when a test needs real files.

#![allow(dead_code)]

use lopdf::{Document, Object, dictionary};
use std::path::{Path, PathBuf};

use pdfmend::document::{PendingDocument, SourceFile};
use pdfmend::{DocumentList, Workspace};

/// A PDF whose pages have the given widths (height 500).
pub fn pdf_with_widths(widths: &[f32]) -> Vec<u8> {
    build(widths, &[], &[])
}

/// `count` pages of width 600.
pub fn pdf_with_pages(count: usize) -> Vec<u8> {
    pdf_with_widths(&vec![600.0; count])
}

/// Pages of width 600, page `i` carrying `annotations[i]` text notes.
pub fn pdf_with_annotations(annotations: &[usize]) -> Vec<u8> {
    build(&vec![600.0; annotations.len()], annotations, &[])
}

/// `count` pages and an info dictionary.
pub fn pdf_with_info(count: usize, info: &[(&str, &str)]) -> Vec<u8> {
    build(&vec![600.0; count], &[], info)
}

fn build(widths: &[f32], annotations: &[usize], info: &[(&str, &str)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for (index, width) in widths.iter().enumerate() {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(*width),
                Object::Integer(500),
            ],
        };

        let notes = annotations.get(index).copied().unwrap_or(0);
        if notes > 0 {
            let annots: Vec<Object> = (0..notes)
                .map(|n| {
                    doc.add_object(dictionary! {
                        "Type" => "Annot",
                        "Subtype" => "Text",
                        "Rect" => vec![
                            Object::Integer(10),
                            Object::Integer(10),
                            Object::Integer(30),
                            Object::Integer(30),
                        ],
                        "Contents" => Object::string_literal(format!("note {n}")),
                    })
                    .into()
                })
                .collect();
            page.set("Annots", annots);
        }

        kids.push(doc.add_object(page).into());
    }

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Count" => widths.len() as i64,
            "Kids" => kids,
        }
        .into(),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if !info.is_empty() {
        let mut dict = lopdf::Dictionary::new();
        for (key, value) in info {
            dict.set(*key, Object::string_literal(*value));
        }
        let info_id = doc.add_object(dict);
        doc.trailer.set("Info", info_id);
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize test PDF");
    bytes
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write test file");
    path
}

/// A pending document named `name`, as if loaded from disk.
pub fn pending(name: &str, bytes: Vec<u8>) -> PendingDocument {
    PendingDocument::from_source(SourceFile::new(PathBuf::from(name), bytes))
}

/// A workspace holding the given documents, in order.
pub fn workspace_with(documents: Vec<(&str, Vec<u8>)>) -> Workspace {
    let mut workspace = Workspace::new();
    for (name, bytes) in documents {
        assert!(workspace.add_document(pending(name, bytes)));
    }
    workspace
}

/// Stored bytes of the document at `index`.
pub fn stored_bytes(documents: &DocumentList, index: usize) -> Vec<u8> {
    documents.get(index).unwrap().bytes().to_vec()
}

/// Page widths of serialized bytes, in page order.
pub fn page_widths(bytes: &[u8]) -> Vec<f32> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            let media = doc
                .get_dictionary(id)
                .unwrap()
                .get(b"MediaBox")
                .unwrap()
                .as_array()
                .unwrap()
                .clone();
            media[2].as_float().unwrap() - media[0].as_float().unwrap()
        })
        .collect()
}

/// `/Rotate` of every page (0 when absent).
pub fn page_rotations(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            doc.get_dictionary(id)
                .unwrap()
                .get(b"Rotate")
                .and_then(Object::as_i64)
                .unwrap_or(0)
        })
        .collect()
}

/// Total annotations over all pages.
pub fn annotation_count(bytes: &[u8]) -> usize {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            doc.get_dictionary(id)
                .unwrap()
                .get(b"Annots")
                .and_then(Object::as_array)
                .map_or(0, |annots| annots.len())
        })
        .sum()
}

/// String value of an info entry, if present.
pub fn info_value(bytes: &[u8], key: &str) -> Option<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?.clone(),
        Object::Dictionary(dict) => dict.clone(),
        _ => return None,
    };
    let value = info.get(key.as_bytes()).ok()?.as_str().ok()?;
    Some(String::from_utf8_lossy(value).into_owned())
}
