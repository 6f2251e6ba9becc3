//! The application context: pending documents plus the open edit session.
//!
//! [`Workspace`] owns everything a front end manipulates. There is no global
//! state, so independent workspaces can coexist in one process.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmend::Workspace;
//! use pdfmend::document::{PendingDocument, SourceFile};
//! use std::path::PathBuf;
//!
//! # async fn example(bytes: Vec<u8>) -> pdfmend::Result<()> {
//! let mut workspace = Workspace::new();
//! workspace.add_document(PendingDocument::from_source(SourceFile::new(
//!     PathBuf::from("scan.pdf"),
//!     bytes,
//! )));
//!
//! workspace.open_for_editing(0).await?;
//! workspace.rotate(90).await?;
//! workspace.strip_metadata().await?;
//! let saved = workspace.commit_and_close()?;
//!
//! let output = workspace.process().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tracing::info;

use crate::backend::{DocumentMutator, DocumentRenderer, LopdfMutator, PreviewRenderer};
use crate::config::{Config, DEFAULT_RENDER_SCALE};
use crate::document::{DocumentList, MoveDirection, PendingDocument};
use crate::error::{Result, ValidationError};
use crate::merge::{ProcessedOutput, process_documents};
use crate::output::Notice;
use crate::session::{
    CropMargins, EditOperation, EditReport, EditSession, PageStep, RenderStatus,
};

/// Pending documents and at most one edit session.
pub struct Workspace<M: DocumentMutator = LopdfMutator, R: DocumentRenderer = PreviewRenderer> {
    documents: DocumentList,
    session: Option<EditSession<M, R>>,
    mutator: Arc<M>,
    renderer: Arc<R>,
    render_scale: f32,
}

impl Workspace {
    /// Workspace backed by `lopdf`.
    pub fn new() -> Self {
        Self::with_backends(LopdfMutator::new(), PreviewRenderer::new())
    }

    /// Workspace using the configured render scale.
    pub fn from_config(config: &Config) -> Self {
        Self::new().with_render_scale(config.render_scale)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: DocumentMutator, R: DocumentRenderer> Workspace<M, R> {
    /// Workspace with custom collaborators.
    pub fn with_backends(mutator: M, renderer: R) -> Self {
        Self {
            documents: DocumentList::new(),
            session: None,
            mutator: Arc::new(mutator),
            renderer: Arc::new(renderer),
            render_scale: DEFAULT_RENDER_SCALE,
        }
    }

    /// Set the preview render scale for sessions opened from now on.
    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale;
        self
    }

    /// The pending documents.
    pub fn documents(&self) -> &DocumentList {
        &self.documents
    }

    /// Append a document. Returns false for a duplicate (same name and size).
    pub fn add_document(&mut self, document: PendingDocument) -> bool {
        self.documents.add(document)
    }

    /// Remove a document. Refused while a session is open.
    pub fn remove_document(&mut self, index: usize) -> Result<PendingDocument> {
        self.ensure_no_session()?;
        self.documents.remove(index)
    }

    /// Swap a document with its neighbour. Refused while a session is open.
    pub fn move_document(&mut self, index: usize, direction: MoveDirection) -> Result<bool> {
        self.ensure_no_session()?;
        self.documents.move_by(index, direction)
    }

    fn ensure_no_session(&self) -> Result<()> {
        match self.session {
            Some(_) => Err(ValidationError::SessionActive.into()),
            None => Ok(()),
        }
    }

    /// The open session, if any.
    pub fn session(&self) -> Option<&EditSession<M, R>> {
        self.session.as_ref()
    }

    /// Whether a document is open for editing.
    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    fn session_mut(&mut self) -> Result<&mut EditSession<M, R>> {
        self.session
            .as_mut()
            .ok_or_else(|| ValidationError::NoActiveSession.into())
    }

    /// Open the document at `index` for editing.
    ///
    /// A session that is already open is replaced only once the new one has
    /// been established; on failure it stays as it was.
    pub async fn open_for_editing(&mut self, index: usize) -> Result<()> {
        let session = EditSession::open(
            Arc::clone(&self.mutator),
            Arc::clone(&self.renderer),
            &self.documents,
            index,
            self.render_scale,
        )
        .await?;

        if let Some(previous) = self.session.replace(session) {
            previous.close();
        }
        Ok(())
    }

    /// Close the editor without further changes. Safe to call when closed.
    pub fn close_editing(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
        }
    }

    /// Keep the committed edits and close the editor.
    ///
    /// Edits are already stored when they succeed, so nothing is written
    /// here.
    pub fn commit_and_close(&mut self) -> Result<Notice> {
        let session = self
            .session
            .take()
            .ok_or(ValidationError::NoActiveSession)?;

        info!(document = %session.document_name(), "changes kept");
        session.close();
        Ok(Notice::success("Changes to PDF saved locally."))
    }

    /// Move one page in the open session.
    pub fn navigate(&mut self, step: PageStep) -> Result<bool> {
        Ok(self.session_mut()?.navigate(step))
    }

    /// Jump to a 1-based page in the open session.
    pub fn go_to_page(&mut self, page: usize) -> Result<bool> {
        self.session_mut()?.go_to_page(page)
    }

    /// Wait for the pending render of the open session.
    pub async fn settle_render(&mut self) -> Result<RenderStatus> {
        Ok(self.session_mut()?.settle_render().await)
    }

    /// Run `operation` through the open session.
    pub async fn apply_edit(&mut self, operation: EditOperation) -> Result<EditReport> {
        let session = self
            .session
            .as_mut()
            .ok_or(ValidationError::NoActiveSession)?;
        session.apply_edit(&mut self.documents, operation).await
    }

    /// Rotate the current page by `degrees` (a multiple of 90).
    pub async fn rotate(&mut self, degrees: i32) -> Result<EditReport> {
        self.apply_edit(EditOperation::Rotate { degrees }).await
    }

    /// Crop the current page by margins.
    pub async fn crop(&mut self, top: f32, bottom: f32, left: f32, right: f32) -> Result<EditReport> {
        self.apply_edit(EditOperation::Crop(CropMargins::new(top, bottom, left, right)))
            .await
    }

    /// Delete the page at a 0-based index.
    pub async fn delete_page(&mut self, page_index: usize) -> Result<EditReport> {
        self.apply_edit(EditOperation::DeletePage { page_index })
            .await
    }

    /// Delete the page under the cursor.
    pub async fn delete_current_page(&mut self) -> Result<EditReport> {
        let page = self.session_mut()?.current_page();
        let page_index = page.checked_sub(1).ok_or(ValidationError::NoPages)?;
        self.delete_page(page_index).await
    }

    /// Remove annotations from every page.
    pub async fn strip_annotations(&mut self) -> Result<EditReport> {
        self.apply_edit(EditOperation::StripAnnotations).await
    }

    /// Blank the document metadata.
    pub async fn strip_metadata(&mut self) -> Result<EditReport> {
        self.apply_edit(EditOperation::StripMetadata).await
    }

    /// Re-serialize with size optimization.
    pub async fn compress(&mut self) -> Result<EditReport> {
        self.apply_edit(EditOperation::Compress).await
    }

    /// Build the final document from the pending list.
    pub async fn process(&self) -> Result<ProcessedOutput> {
        process_documents(&self.documents).await
    }
}

impl<M: DocumentMutator, R: DocumentRenderer> std::fmt::Debug for Workspace<M, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("documents", &self.documents.len())
            .field("session", &self.session)
            .field("render_scale", &self.render_scale)
            .finish()
    }
}
