//! Collaborator contracts for opening, mutating and rendering PDF bytes.
//!
//! The edit session never touches a PDF library directly. It goes through
//! two pairs of traits:
//!
//! - [`DocumentMutator`] opens bytes as a [`MutableDocument`] that supports
//!   the page-level edits and serializes back to bytes.
//! - [`DocumentRenderer`] opens bytes as a read-only [`RenderHandle`] that
//!   reports its page count and renders single pages cancellably.
//!
//! [`lopdf`](self::lopdf) provides the implementations used by the CLI.
//! Page indices are 0-based on [`MutableDocument`]; page numbers are
//! 1-based on [`RenderHandle`].

pub mod lopdf;

pub use self::lopdf::{LopdfDocument, LopdfMutator, PreviewHandle, PreviewRenderer};

use crate::error::Result;
use crate::render::{CancellationToken, RenderedPage};

/// Width and height of a page in PDF units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
}

/// Rectangle given as origin plus extent, in PDF units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// Text fields of the document information dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoField {
    /// `/Title`
    Title,
    /// `/Author`
    Author,
    /// `/Subject`
    Subject,
    /// `/Keywords`
    Keywords,
    /// `/Producer`
    Producer,
    /// `/Creator`
    Creator,
}

impl InfoField {
    /// All text fields, in dictionary order.
    pub const ALL: [InfoField; 6] = [
        Self::Title,
        Self::Author,
        Self::Subject,
        Self::Keywords,
        Self::Producer,
        Self::Creator,
    ];

    /// Dictionary key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Author => "Author",
            Self::Subject => "Subject",
            Self::Keywords => "Keywords",
            Self::Producer => "Producer",
            Self::Creator => "Creator",
        }
    }
}

/// Opens bytes as an editable document.
pub trait DocumentMutator: Send + Sync + 'static {
    /// Handle type produced by [`open`](Self::open).
    type Document: MutableDocument;

    /// Parse `bytes`. Fails with a load error on malformed input.
    fn open(&self, bytes: &[u8]) -> Result<Self::Document>;
}

/// An editable in-memory document.
pub trait MutableDocument: Send {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Effective rotation of a page in degrees.
    fn rotation(&self, page_index: usize) -> Result<i32>;

    /// Set the rotation of a page.
    fn set_rotation(&mut self, page_index: usize, degrees: i32) -> Result<()>;

    /// Size of a page from its media box.
    fn page_size(&self, page_index: usize) -> Result<PageSize>;

    /// Set the crop box of a page.
    fn set_crop_box(&mut self, page_index: usize, rect: CropRect) -> Result<()>;

    /// Remove a page.
    fn remove_page(&mut self, page_index: usize) -> Result<()>;

    /// Whether a page carries an annotations collection.
    fn has_annotations(&self, page_index: usize) -> Result<bool>;

    /// Drop the annotations collection of a page. Returns whether one existed.
    fn delete_annotations(&mut self, page_index: usize) -> Result<bool>;

    /// Set a text field of the information dictionary.
    fn set_info_field(&mut self, field: InfoField, value: &str) -> Result<()>;

    /// Remove an entry from the information dictionary.
    fn remove_info_entry(&mut self, key: &str) -> Result<()>;

    /// Best-effort size optimization applied before the next serialize.
    fn optimize(&mut self) {}

    /// Write the document back to bytes. Fails with a serialize error.
    fn serialize(&mut self) -> Result<Vec<u8>>;
}

/// Opens bytes as a read-only paginated view.
pub trait DocumentRenderer: Send + Sync + 'static {
    /// Handle type produced by [`open`](Self::open).
    type Handle: RenderHandle;

    /// Parse `bytes`. Fails with a load error on malformed input.
    fn open(&self, bytes: &[u8]) -> Result<Self::Handle>;
}

/// Read-only view used to render pages.
///
/// Handles are cloned into render tasks, so clones must be cheap.
pub trait RenderHandle: Clone + Send + Sync + 'static {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Render a 1-based page at `scale`.
    ///
    /// Implementations should poll `token` between expensive steps and
    /// return a cancellation error once it is set.
    fn render_page(
        &self,
        page_number: usize,
        scale: f32,
        token: &CancellationToken,
    ) -> Result<RenderedPage>;
}
