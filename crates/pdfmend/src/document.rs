//! Pending documents and the ordered list that holds them.
//!
//! A [`PendingDocument`] is either the file exactly as it was selected
//! ([`DocumentContent::Original`]) or the bytes produced by the most recent
//! committed edit ([`DocumentContent::Edited`]). The list order is the merge
//! order.
//!
//! # Examples
//!
//! ```
//! use pdfmend::document::{DocumentList, PendingDocument, SourceFile};
//! use std::path::PathBuf;
//!
//! let mut list = DocumentList::new();
//! let source = SourceFile::new(PathBuf::from("a.pdf"), b"%PDF-1.4".to_vec());
//! assert!(list.add(PendingDocument::from_source(source.clone())));
//!
//! // Same name and size: ignored.
//! assert!(!list.add(PendingDocument::from_source(source)));
//! assert_eq!(list.len(), 1);
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, ValidationError};
use crate::utils::format_file_size;

/// A file as it was selected, with its bytes captured at selection time.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    bytes: Arc<[u8]>,
}

impl SourceFile {
    /// Wrap bytes read from `path`.
    pub fn new(path: PathBuf, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path,
            bytes: bytes.into(),
        }
    }

    /// Path the file was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original bytes.
    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }
}

/// Current content of a pending document.
#[derive(Debug, Clone)]
pub enum DocumentContent {
    /// Untouched since selection.
    Original(SourceFile),
    /// Produced by the last committed edit.
    Edited(Arc<[u8]>),
}

impl DocumentContent {
    /// Bytes of the active representation.
    pub fn bytes(&self) -> &Arc<[u8]> {
        match self {
            Self::Original(source) => source.bytes(),
            Self::Edited(bytes) => bytes,
        }
    }

    /// Whether an edit has been committed.
    pub fn is_edited(&self) -> bool {
        matches!(self, Self::Edited(_))
    }
}

/// One entry in the pending list.
#[derive(Debug, Clone)]
pub struct PendingDocument {
    name: String,
    content: DocumentContent,
}

impl PendingDocument {
    /// Create a document with an explicit display name.
    pub fn new(name: impl Into<String>, content: DocumentContent) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Create a document named after the source file.
    pub fn from_source(source: SourceFile) -> Self {
        let name = source
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.path().display().to_string());

        Self::new(name, DocumentContent::Original(source))
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current content.
    pub fn content(&self) -> &DocumentContent {
        &self.content
    }

    /// Current bytes.
    pub fn bytes(&self) -> &Arc<[u8]> {
        self.content.bytes()
    }

    /// Size of the current content in bytes.
    pub fn byte_len(&self) -> u64 {
        self.content.bytes().len() as u64
    }
}

/// Serializable view of a list entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// 1-based list position.
    pub position: usize,
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub byte_length: u64,
    /// Human-readable size.
    pub size: String,
    /// Whether the content comes from an edit.
    pub edited: bool,
}

/// Direction for [`DocumentList::move_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the front of the list.
    Up,
    /// Towards the back of the list.
    Down,
}

/// Ordered list of pending documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentList {
    documents: Vec<PendingDocument>,
}

impl DocumentList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document unless one with the same name and size is present.
    ///
    /// Returns whether the document was added.
    pub fn add(&mut self, document: PendingDocument) -> bool {
        let duplicate = self.documents.iter().any(|existing| {
            existing.name == document.name && existing.byte_len() == document.byte_len()
        });

        if duplicate {
            return false;
        }

        self.documents.push(document);
        true
    }

    /// Remove and return the document at `index`.
    pub fn remove(&mut self, index: usize) -> Result<PendingDocument> {
        self.check_index(index)?;
        Ok(self.documents.remove(index))
    }

    /// Swap the document at `index` with its neighbour.
    ///
    /// Moving the first entry up or the last entry down is a no-op.
    /// Returns whether anything moved.
    pub fn move_by(&mut self, index: usize, direction: MoveDirection) -> Result<bool> {
        self.check_index(index)?;

        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|&next| next < self.documents.len()),
        };

        match target {
            Some(target) => {
                self.documents.swap(index, target);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Document at `index`.
    pub fn get(&self, index: usize) -> Result<&PendingDocument> {
        self.check_index(index)?;
        Ok(&self.documents[index])
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate in list order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingDocument> {
        self.documents.iter()
    }

    /// Summaries in list order.
    pub fn summaries(&self) -> Vec<DocumentSummary> {
        self.documents
            .iter()
            .enumerate()
            .map(|(index, doc)| DocumentSummary {
                position: index + 1,
                name: doc.name.clone(),
                byte_length: doc.byte_len(),
                size: format_file_size(doc.byte_len()),
                edited: doc.content.is_edited(),
            })
            .collect()
    }

    /// Replace the content of the document at `index` in one step.
    pub(crate) fn replace_content(&mut self, index: usize, bytes: Arc<[u8]>) -> Result<()> {
        self.check_index(index)?;
        self.documents[index].content = DocumentContent::Edited(bytes);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.documents.len() {
            Ok(())
        } else {
            Err(ValidationError::IndexOutOfRange {
                position: index + 1,
                len: self.documents.len(),
            }
            .into())
        }
    }
}
