//! In-memory PDF fixtures for unit tests.

use lopdf::{Document, Object, ObjectId, dictionary};

const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

struct PageSpec {
    media_box: [f32; 4],
    annotations: usize,
}

/// Builds small PDFs with just enough structure for the editing code.
pub(crate) struct PdfBuilder {
    pages: Vec<PageSpec>,
    tree_rotation: Option<i64>,
    inherited_media_box: bool,
    info: Vec<(&'static str, String)>,
}

impl PdfBuilder {
    pub(crate) fn new() -> Self {
        Self {
            pages: Vec::new(),
            tree_rotation: None,
            inherited_media_box: false,
            info: Vec::new(),
        }
    }

    /// Append `count` US Letter pages.
    pub(crate) fn pages(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.pages.push(PageSpec {
                media_box: LETTER,
                annotations: 0,
            });
        }
        self
    }

    /// Append one page with its own media box.
    pub(crate) fn page_with_media_box(mut self, media_box: [f32; 4]) -> Self {
        self.pages.push(PageSpec {
            media_box,
            annotations: 0,
        });
        self
    }

    /// Put `/Rotate` on the page tree root instead of the pages.
    pub(crate) fn tree_rotation(mut self, degrees: i64) -> Self {
        self.tree_rotation = Some(degrees);
        self
    }

    /// Put a US Letter `/MediaBox` on the page tree root only.
    pub(crate) fn inherited_media_box(mut self) -> Self {
        self.inherited_media_box = true;
        self
    }

    /// Give the page at `index` some text annotations.
    pub(crate) fn annotations_on(mut self, index: usize, count: usize) -> Self {
        self.pages[index].annotations = count;
        self
    }

    /// Add an info dictionary entry.
    pub(crate) fn info(mut self, key: &'static str, value: &str) -> Self {
        self.info.push((key, value.to_string()));
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for spec in &self.pages {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            };
            if !self.inherited_media_box {
                page.set("MediaBox", rect(spec.media_box));
            }
            if spec.annotations > 0 {
                let annots: Vec<Object> = (0..spec.annotations)
                    .map(|n| add_annotation(&mut doc, n).into())
                    .collect();
                page.set("Annots", annots);
            }
            kids.push(doc.add_object(page).into());
        }

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Count" => self.pages.len() as i64,
            "Kids" => kids,
        };
        if let Some(degrees) = self.tree_rotation {
            pages.set("Rotate", degrees);
        }
        if self.inherited_media_box {
            pages.set("MediaBox", rect(LETTER));
        }
        doc.objects.insert(pages_id, pages.into());

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if !self.info.is_empty() {
            let mut info = lopdf::Dictionary::new();
            for (key, value) in &self.info {
                info.set(*key, Object::string_literal(value.as_str()));
            }
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

fn rect(values: [f32; 4]) -> Object {
    Object::Array(values.iter().map(|v| Object::Real(*v)).collect())
}

fn add_annotation(doc: &mut Document, n: usize) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => rect([10.0, 10.0, 30.0, 30.0]),
        "Contents" => Object::string_literal(format!("note {n}")),
    })
}

/// Read a string entry from the info dictionary of serialized bytes.
pub(crate) fn info_string(bytes: &[u8], key: &str) -> Option<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let value = info.get(key.as_bytes()).ok()?.as_str().ok()?;
    Some(String::from_utf8_lossy(value).into_owned())
}

/// Page widths of serialized bytes in page order.
pub(crate) fn page_widths(bytes: &[u8]) -> Vec<f32> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let media = doc
                .get_dictionary(page_id)
                .unwrap()
                .get(b"MediaBox")
                .unwrap()
                .as_array()
                .unwrap();
            media[2].as_float().unwrap() - media[0].as_float().unwrap()
        })
        .collect()
}

/// `/Rotate` of the page at `index` in serialized bytes (0 when absent).
pub(crate) fn page_rotation(bytes: &[u8], index: usize) -> i64 {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = doc.get_pages().into_values().nth(index).unwrap();
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"Rotate")
        .and_then(Object::as_i64)
        .unwrap_or(0)
}
