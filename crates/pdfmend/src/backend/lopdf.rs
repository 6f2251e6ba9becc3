//! `lopdf` implementations of the collaborator traits.
//!
//! [`LopdfMutator`] opens bytes into a [`LopdfDocument`] and applies edits
//! directly to the page dictionaries. [`PreviewRenderer`] opens bytes into a
//! [`PreviewHandle`] that keeps only per-page geometry and renders a page as
//! its viewport at a given scale; pixel rasterization is left to renderers
//! that implement [`RenderHandle`] on top of a rasterizing library.
//!
//! Page attributes that PDF allows to be inherited (`MediaBox`, `CropBox`,
//! `Rotate`) are looked up along the `Parent` chain.

use ::lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::sync::Arc;
use tracing::debug;

use super::{
    CropRect, DocumentMutator, DocumentRenderer, InfoField, MutableDocument, PageSize,
    RenderHandle,
};
use crate::error::{PdfMendError, Result, ValidationError};
use crate::render::{CancellationToken, RenderedPage};

/// Name used for load errors until the caller attaches the document name.
const UNNAMED: &str = "document";

/// Guard against cyclic `Parent` chains.
const MAX_TREE_DEPTH: usize = 64;

/// US Letter, used when a page has no media box at all.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

pub(crate) fn load_document(bytes: &[u8]) -> Result<Document> {
    let document =
        Document::load_mem(bytes).map_err(|e| PdfMendError::load(UNNAMED, e.to_string()))?;

    if document.is_encrypted() {
        return Err(PdfMendError::load(
            UNNAMED,
            "PDF is encrypted; decrypt it first (e.g. 'qpdf --decrypt')",
        ));
    }

    Ok(document)
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Look up a page attribute, walking up the page tree when it is inherited.
pub(crate) fn inherited_attribute<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = document.get_dictionary(page_id).ok();
    let mut depth = 0;

    while let Some(dict) = node {
        if let Ok(value) = dict.get(key) {
            return resolve(document, value);
        }

        depth += 1;
        if depth > MAX_TREE_DEPTH {
            break;
        }

        node = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|parent| document.get_dictionary(parent))
            .ok();
    }

    None
}

fn rectangle(object: &Object) -> Option<[f32; 4]> {
    let items = object.as_array().ok()?;
    if items.len() != 4 {
        return None;
    }

    let mut rect = [0.0; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = item.as_float().ok()?;
    }
    Some(rect)
}

/// Normalize `[x0 y0 x1 y1]` so that the first corner is the lower-left one.
fn normalized(rect: [f32; 4]) -> [f32; 4] {
    [
        rect[0].min(rect[2]),
        rect[1].min(rect[3]),
        rect[0].max(rect[2]),
        rect[1].max(rect[3]),
    ]
}

fn media_box(document: &Document, page_id: ObjectId) -> [f32; 4] {
    inherited_attribute(document, page_id, b"MediaBox")
        .and_then(rectangle)
        .map(normalized)
        .unwrap_or(DEFAULT_MEDIA_BOX)
}

fn page_rotation(document: &Document, page_id: ObjectId) -> i32 {
    inherited_attribute(document, page_id, b"Rotate")
        .and_then(|value| {
            value
                .as_i64()
                .ok()
                .or_else(|| value.as_float().ok().map(|degrees| degrees.round() as i64))
        })
        .map(|degrees| degrees.rem_euclid(360) as i32)
        .unwrap_or(0)
}

fn page_dictionary_mut(document: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    Ok(document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)?)
}

/// Opens PDF bytes with `lopdf` for editing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfMutator;

impl LopdfMutator {
    /// Create a new mutator.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentMutator for LopdfMutator {
    type Document = LopdfDocument;

    fn open(&self, bytes: &[u8]) -> Result<LopdfDocument> {
        LopdfDocument::load(bytes)
    }
}

/// An editable `lopdf` document.
#[derive(Debug)]
pub struct LopdfDocument {
    document: Document,
    pages: Vec<ObjectId>,
}

impl LopdfDocument {
    /// Parse `bytes`.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let document = load_document(bytes)?;
        let pages = document.get_pages().into_values().collect();
        Ok(Self { document, pages })
    }

    /// The underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.pages.get(page_index).copied().ok_or_else(|| {
            ValidationError::PageOutOfRange {
                page: page_index + 1,
                page_count: self.pages.len(),
            }
            .into()
        })
    }

    fn info_dictionary_mut(&mut self) -> Result<&mut Dictionary> {
        let referenced = self
            .document
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .ok()
            .filter(|id| self.document.get_dictionary(*id).is_ok());

        let info_id = match referenced {
            Some(id) => id,
            None => {
                // Missing, dangling, or stored inline in the trailer.
                let inline = self
                    .document
                    .trailer
                    .get(b"Info")
                    .and_then(Object::as_dict)
                    .ok()
                    .cloned()
                    .unwrap_or_default();
                let id = self.document.add_object(Object::Dictionary(inline));
                self.document.trailer.set("Info", Object::Reference(id));
                id
            }
        };

        Ok(self
            .document
            .get_object_mut(info_id)
            .and_then(Object::as_dict_mut)?)
    }
}

impl MutableDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn rotation(&self, page_index: usize) -> Result<i32> {
        let page_id = self.page_id(page_index)?;
        Ok(page_rotation(&self.document, page_id))
    }

    fn set_rotation(&mut self, page_index: usize, degrees: i32) -> Result<()> {
        let page_id = self.page_id(page_index)?;
        page_dictionary_mut(&mut self.document, page_id)?
            .set("Rotate", Object::Integer(i64::from(degrees)));
        Ok(())
    }

    fn page_size(&self, page_index: usize) -> Result<PageSize> {
        let page_id = self.page_id(page_index)?;
        let [x0, y0, x1, y1] = media_box(&self.document, page_id);
        Ok(PageSize {
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    fn set_crop_box(&mut self, page_index: usize, rect: CropRect) -> Result<()> {
        let page_id = self.page_id(page_index)?;
        let [origin_x, origin_y, _, _] = media_box(&self.document, page_id);

        let left = origin_x + rect.x;
        let bottom = origin_y + rect.y;
        let crop_box = vec![
            Object::Real(left),
            Object::Real(bottom),
            Object::Real(left + rect.width),
            Object::Real(bottom + rect.height),
        ];

        page_dictionary_mut(&mut self.document, page_id)?.set("CropBox", Object::Array(crop_box));
        Ok(())
    }

    fn remove_page(&mut self, page_index: usize) -> Result<()> {
        self.page_id(page_index)?;
        let before = self.pages.len();

        self.document.delete_pages(&[(page_index + 1) as u32]);
        self.pages = self.document.get_pages().into_values().collect();

        if self.pages.len() != before - 1 {
            return Err(PdfMendError::edit_failed(format!(
                "Page {} could not be removed from the page tree",
                page_index + 1
            )));
        }

        debug!(page = page_index + 1, remaining = self.pages.len(), "page removed");
        Ok(())
    }

    fn has_annotations(&self, page_index: usize) -> Result<bool> {
        let page_id = self.page_id(page_index)?;
        Ok(self.document.get_dictionary(page_id)?.has(b"Annots"))
    }

    fn delete_annotations(&mut self, page_index: usize) -> Result<bool> {
        let page_id = self.page_id(page_index)?;
        Ok(page_dictionary_mut(&mut self.document, page_id)?
            .remove(b"Annots")
            .is_some())
    }

    fn set_info_field(&mut self, field: InfoField, value: &str) -> Result<()> {
        self.info_dictionary_mut()?.set(
            field.key(),
            Object::String(value.as_bytes().to_vec(), StringFormat::Literal),
        );
        Ok(())
    }

    fn remove_info_entry(&mut self, key: &str) -> Result<()> {
        self.info_dictionary_mut()?.remove(key.as_bytes());
        Ok(())
    }

    fn optimize(&mut self) {
        let pruned = self.document.prune_objects();
        self.document.compress();
        debug!(pruned = pruned.len(), "document optimized");
    }

    fn serialize(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.document
            .save_to(&mut buffer)
            .map_err(|e| PdfMendError::serialize(e.to_string()))?;
        Ok(buffer)
    }
}

/// Geometry of one page, captured when the preview handle is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageGeometry {
    media_box: [f32; 4],
    crop_box: Option<[f32; 4]>,
    rotation: i32,
    annotations: usize,
}

impl PageGeometry {
    fn read(document: &Document, page_id: ObjectId) -> Self {
        let annotations = document
            .get_dictionary(page_id)
            .ok()
            .and_then(|page| page.get(b"Annots").ok())
            .and_then(|annots| resolve(document, annots))
            .and_then(|annots| annots.as_array().ok())
            .map_or(0, Vec::len);

        Self {
            media_box: media_box(document, page_id),
            crop_box: inherited_attribute(document, page_id, b"CropBox")
                .and_then(rectangle)
                .map(normalized),
            rotation: page_rotation(document, page_id),
            annotations,
        }
    }

    /// Visible region: crop box clipped to the media box.
    fn view_box(&self) -> [f32; 4] {
        let media = self.media_box;
        match self.crop_box {
            Some(crop) => [
                crop[0].max(media[0]),
                crop[1].max(media[1]),
                crop[2].min(media[2]),
                crop[3].min(media[3]),
            ],
            None => media,
        }
    }
}

/// Opens PDF bytes for page previews.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewRenderer;

impl PreviewRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for PreviewRenderer {
    type Handle = PreviewHandle;

    fn open(&self, bytes: &[u8]) -> Result<PreviewHandle> {
        let document = load_document(bytes)?;
        let pages = document
            .get_pages()
            .into_values()
            .map(|page_id| PageGeometry::read(&document, page_id))
            .collect();

        Ok(PreviewHandle { pages })
    }
}

/// Read-only page view produced by [`PreviewRenderer`].
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    pages: Arc<[PageGeometry]>,
}

impl RenderHandle for PreviewHandle {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(
        &self,
        page_number: usize,
        scale: f32,
        token: &CancellationToken,
    ) -> Result<RenderedPage> {
        token.check(page_number)?;

        let geometry = page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .ok_or_else(|| {
                PdfMendError::render(
                    page_number,
                    format!("document has {} page(s)", self.pages.len()),
                )
            })?;

        let [x0, y0, x1, y1] = geometry.view_box();
        let (mut width, mut height) = (x1 - x0, y1 - y0);
        if width <= 0.0 || height <= 0.0 {
            return Err(PdfMendError::render(page_number, "page has an empty view box"));
        }
        if geometry.rotation % 180 != 0 {
            std::mem::swap(&mut width, &mut height);
        }

        token.check(page_number)?;

        Ok(RenderedPage {
            page_number,
            width: (width * scale).ceil() as u32,
            height: (height * scale).ceil() as u32,
            rotation: geometry.rotation,
            scale,
            annotations: geometry.annotations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{PdfBuilder, info_string};

    fn open(bytes: &[u8]) -> LopdfDocument {
        LopdfMutator::new().open(bytes).unwrap()
    }

    #[test]
    fn test_open_rejects_garbage() {
        let err = LopdfMutator::new().open(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PdfMendError::Load { .. }));

        let err = PreviewRenderer::new().open(b"%PDF-1.4 broken").unwrap_err();
        assert!(matches!(err, PdfMendError::Load { .. }));
    }

    #[test]
    fn test_page_count_matches_between_collaborators() {
        let bytes = PdfBuilder::new().pages(4).build();
        assert_eq!(open(&bytes).page_count(), 4);
        assert_eq!(PreviewRenderer::new().open(&bytes).unwrap().page_count(), 4);
    }

    #[test]
    fn test_rotation_is_inherited_from_page_tree() {
        let bytes = PdfBuilder::new().pages(2).tree_rotation(90).build();
        let mut doc = open(&bytes);

        assert_eq!(doc.rotation(0).unwrap(), 90);

        doc.set_rotation(1, 180).unwrap();
        assert_eq!(doc.rotation(0).unwrap(), 90);
        assert_eq!(doc.rotation(1).unwrap(), 180);
    }

    #[test]
    fn test_rotation_accepts_real_and_oversized_values() {
        let mut source = Document::load_mem(&PdfBuilder::new().pages(3).build()).unwrap();
        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        let values = [
            Object::Real(450.0),
            Object::Integer(360 * 10_000_000 + 270),
            Object::Integer(-90),
        ];
        for (page_id, value) in page_ids.iter().zip(values) {
            source
                .get_dictionary_mut(*page_id)
                .unwrap()
                .set("Rotate", value);
        }
        let mut bytes = Vec::new();
        source.save_to(&mut bytes).unwrap();

        let doc = open(&bytes);
        assert_eq!(doc.rotation(0).unwrap(), 90);
        assert_eq!(doc.rotation(1).unwrap(), 270);
        assert_eq!(doc.rotation(2).unwrap(), 270);
    }

    #[test]
    fn test_page_size_uses_inherited_media_box() {
        let bytes = PdfBuilder::new().pages(1).inherited_media_box().build();
        let size = open(&bytes).page_size(0).unwrap();
        assert_eq!(size, PageSize { width: 612.0, height: 792.0 });
    }

    #[test]
    fn test_crop_box_is_offset_by_media_box_origin() {
        let bytes = PdfBuilder::new()
            .page_with_media_box([10.0, 20.0, 210.0, 320.0])
            .build();
        let mut doc = open(&bytes);

        doc.set_crop_box(
            0,
            CropRect {
                x: 5.0,
                y: 15.0,
                width: 100.0,
                height: 50.0,
            },
        )
        .unwrap();

        let page_id = doc.page_id(0).unwrap();
        let crop = doc
            .document()
            .get_dictionary(page_id)
            .unwrap()
            .get(b"CropBox")
            .ok()
            .and_then(rectangle)
            .unwrap();
        assert_eq!(crop, [15.0, 35.0, 115.0, 85.0]);
    }

    #[test]
    fn test_remove_page() {
        let bytes = PdfBuilder::new().pages(3).build();
        let mut doc = open(&bytes);

        doc.remove_page(1).unwrap();
        assert_eq!(doc.page_count(), 2);

        let reopened = open(&doc.serialize().unwrap());
        assert_eq!(reopened.page_count(), 2);
    }

    #[test]
    fn test_out_of_range_page() {
        let bytes = PdfBuilder::new().pages(1).build();
        let mut doc = open(&bytes);

        let err = doc.rotation(3).unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::PageOutOfRange {
                page: 4,
                page_count: 1
            })
        );
        assert!(doc.remove_page(1).is_err());
    }

    #[test]
    fn test_annotations() {
        let bytes = PdfBuilder::new().pages(2).annotations_on(1, 3).build();
        let mut doc = open(&bytes);

        assert!(!doc.has_annotations(0).unwrap());
        assert!(doc.has_annotations(1).unwrap());

        assert!(doc.delete_annotations(1).unwrap());
        assert!(!doc.delete_annotations(1).unwrap());
        assert!(!doc.has_annotations(1).unwrap());
    }

    #[test]
    fn test_info_fields_created_when_missing() {
        let bytes = PdfBuilder::new().pages(1).build();
        let mut doc = open(&bytes);

        doc.set_info_field(InfoField::Title, "").unwrap();
        doc.remove_info_entry("ModDate").unwrap();

        let saved = doc.serialize().unwrap();
        assert_eq!(info_string(&saved, "Title").as_deref(), Some(""));
    }

    #[test]
    fn test_info_fields_overwrite_existing() {
        let bytes = PdfBuilder::new()
            .pages(1)
            .info("Author", "Jane Roe")
            .info("CreationDate", "D:20240101000000Z")
            .build();
        let mut doc = open(&bytes);

        doc.set_info_field(InfoField::Author, "").unwrap();
        doc.remove_info_entry("CreationDate").unwrap();

        let saved = doc.serialize().unwrap();
        assert_eq!(info_string(&saved, "Author").as_deref(), Some(""));
        assert_eq!(info_string(&saved, "CreationDate"), None);
    }

    #[test]
    fn test_preview_viewport_honours_crop_and_rotation() {
        let bytes = PdfBuilder::new()
            .page_with_media_box([0.0, 0.0, 200.0, 100.0])
            .build();
        let mut doc = open(&bytes);
        doc.set_crop_box(
            0,
            CropRect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 100.0,
            },
        )
        .unwrap();
        doc.set_rotation(0, 90).unwrap();
        let bytes = doc.serialize().unwrap();

        let handle = PreviewRenderer::new().open(&bytes).unwrap();
        let page = handle
            .render_page(1, 1.5, &CancellationToken::new())
            .unwrap();

        assert_eq!(page.rotation, 90);
        assert_eq!((page.width, page.height), (150, 150));
    }

    #[test]
    fn test_preview_rotated_page_swaps_dimensions() {
        let bytes = PdfBuilder::new()
            .page_with_media_box([0.0, 0.0, 200.0, 100.0])
            .build();
        let mut doc = open(&bytes);
        doc.set_rotation(0, 270).unwrap();
        let bytes = doc.serialize().unwrap();

        let page = PreviewRenderer::new()
            .open(&bytes)
            .unwrap()
            .render_page(1, 1.0, &CancellationToken::new())
            .unwrap();
        assert_eq!((page.width, page.height), (100, 200));
    }

    #[test]
    fn test_preview_counts_annotations() {
        let bytes = PdfBuilder::new().pages(2).annotations_on(0, 2).build();
        let handle = PreviewRenderer::new().open(&bytes).unwrap();
        let token = CancellationToken::new();

        assert_eq!(handle.render_page(1, 1.0, &token).unwrap().annotations, 2);
        assert_eq!(handle.render_page(2, 1.0, &token).unwrap().annotations, 0);
    }

    #[test]
    fn test_preview_render_errors() {
        let bytes = PdfBuilder::new().pages(1).build();
        let handle = PreviewRenderer::new().open(&bytes).unwrap();

        let err = handle
            .render_page(2, 1.0, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, PdfMendError::Render { page: 2, .. }));

        let token = CancellationToken::new();
        token.cancel();
        assert!(handle.render_page(1, 1.0, &token).unwrap_err().is_cancellation());
    }
}
