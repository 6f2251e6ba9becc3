//! The document editing session.
//!
//! An [`EditSession`] tracks one pending document while it is open for
//! editing: its render handle, the page cursor, the pending page render and
//! whether compression is still allowed. Every edit goes through
//! [`EditSession::apply_edit`], which runs one reconciliation cycle:
//!
//! 1. open a fresh mutable document from the stored bytes,
//! 2. apply the mutation,
//! 3. serialize to new bytes,
//! 4. replace the stored bytes,
//! 5. re-open the render handle on the new bytes,
//! 6. clamp the page cursor to the new page count,
//! 7. request a render of the current page.
//!
//! Steps 1 to 3 and the render-handle open run on the blocking pool; the
//! handle is opened from the new bytes before anything is committed, so a
//! failure at any step leaves the stored document untouched. Steps 4 to 6
//! happen together without a suspension point.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmend::backend::{LopdfMutator, PreviewRenderer};
//! use pdfmend::document::DocumentList;
//! use pdfmend::session::{EditOperation, EditSession, PageStep};
//! use std::sync::Arc;
//!
//! # async fn example(mut documents: DocumentList) -> pdfmend::Result<()> {
//! let mut session = EditSession::open(
//!     Arc::new(LopdfMutator::new()),
//!     Arc::new(PreviewRenderer::new()),
//!     &documents,
//!     0,
//!     1.5,
//! )
//! .await?;
//!
//! session.navigate(PageStep::Next);
//! session
//!     .apply_edit(&mut documents, EditOperation::rotate_right())
//!     .await?;
//! let frame = session.settle_render().await;
//! # Ok(())
//! # }
//! ```

mod cursor;
mod operation;

pub use cursor::{PageCursor, PageStep};
pub use operation::{CropMargins, EditOperation};

use std::sync::Arc;
use tokio::task;
use tracing::{debug, info, instrument, warn};

use crate::backend::{DocumentMutator, DocumentRenderer, MutableDocument, RenderHandle};
use crate::document::DocumentList;
use crate::error::{PdfMendError, Result, ValidationError};
use crate::output::Notice;
use crate::render::{RenderTask, RenderedPage};
use operation::Mutation;

/// Outcome of one [`EditSession::apply_edit`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct EditReport {
    /// The operation that ran.
    pub operation: EditOperation,

    /// Whether new bytes were committed.
    pub committed: bool,

    /// 1-based page the operation acted on (0 for document-wide edits).
    pub page: usize,

    /// Cursor after reconciliation.
    pub cursor: PageCursor,
}

impl EditReport {
    /// User-facing message for this outcome.
    pub fn notice(&self) -> Notice {
        match &self.operation {
            EditOperation::Rotate { .. } => Notice::success(format!("Page {} rotated.", self.page)),
            EditOperation::Crop(_) => Notice::success(format!("Page {} cropped.", self.page)),
            EditOperation::DeletePage { .. } if self.cursor.is_empty() => {
                Notice::info("All pages deleted.")
            }
            EditOperation::DeletePage { .. } => {
                Notice::success(format!("Page {} deleted.", self.page))
            }
            EditOperation::StripAnnotations if self.committed => {
                Notice::success("Annotations (comments) removed.")
            }
            EditOperation::StripAnnotations => Notice::info("No annotations found to remove."),
            EditOperation::StripMetadata => Notice::success(
                "Metadata removed successfully. Compression has been disabled for this \
                 document since you cannot do both.",
            ),
            EditOperation::Compress => Notice::success("PDF re-processed (basic optimization)."),
        }
    }
}

/// Result of waiting for the pending render.
#[derive(Debug)]
pub enum RenderStatus {
    /// The latest requested page was rendered.
    Rendered(RenderedPage),
    /// The document has no pages, so nothing is rendered.
    NoPages,
    /// No render was pending.
    Idle,
    /// The render was cancelled or superseded; not an error.
    Cancelled,
    /// Rendering failed.
    Failed(PdfMendError),
}

struct PendingRender {
    generation: u64,
    task: RenderTask,
}

enum EditOutcome<H> {
    Unchanged,
    Committed { bytes: Arc<[u8]>, handle: H },
}

/// State of the document currently open for editing.
pub struct EditSession<M: DocumentMutator, R: DocumentRenderer> {
    mutator: Arc<M>,
    renderer: Arc<R>,
    target_index: usize,
    document_name: String,
    render_handle: R::Handle,
    cursor: PageCursor,
    compression_disabled: bool,
    render_scale: f32,
    pending_render: Option<PendingRender>,
    render_generation: u64,
    displayed: Option<RenderedPage>,
}

impl<M: DocumentMutator, R: DocumentRenderer> EditSession<M, R> {
    /// Open the document at `index` for editing.
    ///
    /// Opens a render handle on the document's current bytes, puts the
    /// cursor on page 1 and requests its render. Must be called from within
    /// a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid index and a load error when
    /// the bytes are not a readable PDF.
    #[instrument(skip_all, fields(index))]
    pub async fn open(
        mutator: Arc<M>,
        renderer: Arc<R>,
        documents: &DocumentList,
        index: usize,
        render_scale: f32,
    ) -> Result<Self> {
        let document = documents.get(index)?;
        let document_name = document.name().to_string();
        let bytes = Arc::clone(document.bytes());

        let open_renderer = Arc::clone(&renderer);
        let render_handle = task::spawn_blocking(move || open_renderer.open(&bytes))
            .await
            .map_err(|e| PdfMendError::other(format!("Open task failed: {e}")))?
            .map_err(|e| e.with_document_name(&document_name))?;

        let cursor = PageCursor::new(render_handle.page_count());
        info!(document = %document_name, pages = cursor.page_count(), "opened for editing");

        let mut session = Self {
            mutator,
            renderer,
            target_index: index,
            document_name,
            render_handle,
            cursor,
            compression_disabled: false,
            render_scale,
            pending_render: None,
            render_generation: 0,
            displayed: None,
        };
        session.request_render();

        Ok(session)
    }

    /// Index of the document being edited.
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Name of the document being edited.
    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    /// Page cursor.
    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Number of pages, as reported by the render handle.
    pub fn page_count(&self) -> usize {
        self.cursor.page_count()
    }

    /// Current 1-based page, 0 when the document has no pages.
    pub fn current_page(&self) -> usize {
        self.cursor.page_number()
    }

    /// Whether compression was disabled by a metadata strip.
    pub fn compression_disabled(&self) -> bool {
        self.compression_disabled
    }

    /// The most recently applied render.
    pub fn displayed_page(&self) -> Option<&RenderedPage> {
        self.displayed.as_ref()
    }

    /// Whether a render is pending.
    pub fn is_rendering(&self) -> bool {
        self.pending_render.is_some()
    }

    /// Move one page and request its render.
    ///
    /// Returns false (and renders nothing) at either end of the document.
    pub fn navigate(&mut self, step: PageStep) -> bool {
        let moved = self.cursor.step(step);
        if moved {
            self.request_render();
        }
        moved
    }

    /// Jump to a 1-based page and request its render.
    pub fn go_to_page(&mut self, page: usize) -> Result<bool> {
        let moved = self.cursor.go_to(page)?;
        if moved {
            self.request_render();
        }
        Ok(moved)
    }

    /// Run one reconciliation cycle for `operation`.
    ///
    /// `documents` must be the list the session was opened from.
    ///
    /// # Errors
    ///
    /// Validation, load, serialize and edit errors abort the cycle before
    /// anything is committed; the stored bytes are left exactly as they were.
    #[instrument(skip_all, fields(document = %self.document_name, operation = operation.name()))]
    pub async fn apply_edit(
        &mut self,
        documents: &mut DocumentList,
        operation: EditOperation,
    ) -> Result<EditReport> {
        operation.validate()?;
        if operation == EditOperation::Compress && self.compression_disabled {
            return Err(ValidationError::CompressionDisabled.into());
        }

        let acted_page = match &operation {
            EditOperation::Rotate { .. } | EditOperation::Crop(_) => self.cursor.page_number(),
            EditOperation::DeletePage { page_index } => page_index + 1,
            _ => 0,
        };

        let bytes = Arc::clone(documents.get(self.target_index)?.bytes());
        let mutator = Arc::clone(&self.mutator);
        let renderer = Arc::clone(&self.renderer);
        let current_page = self.cursor.page_number();
        let job = operation.clone();

        let outcome = task::spawn_blocking(move || -> Result<EditOutcome<R::Handle>> {
            let mut document = mutator.open(&bytes)?;
            if job.apply(&mut document, current_page)? == Mutation::Unchanged {
                return Ok(EditOutcome::Unchanged);
            }

            let expected_pages = document.page_count();
            let bytes: Arc<[u8]> = document.serialize()?.into();
            drop(document);

            let handle = renderer.open(&bytes)?;
            if handle.page_count() != expected_pages {
                return Err(PdfMendError::serialize(format!(
                    "saved document has {} page(s), expected {expected_pages}",
                    handle.page_count()
                )));
            }

            Ok(EditOutcome::Committed { bytes, handle })
        })
        .await
        .map_err(|e| PdfMendError::other(format!("Edit task failed: {e}")))?
        .map_err(|e| e.with_document_name(&self.document_name));

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "edit rejected");
                return Err(err);
            }
        };

        let committed = match outcome {
            EditOutcome::Unchanged => {
                debug!("nothing to change");
                false
            }
            EditOutcome::Committed { bytes, handle } => {
                let byte_len = bytes.len();
                documents.replace_content(self.target_index, bytes)?;
                self.render_handle = handle;
                self.cursor.reconcile(self.render_handle.page_count());
                if operation == EditOperation::StripMetadata {
                    self.compression_disabled = true;
                }

                info!(
                    bytes = byte_len,
                    pages = self.cursor.page_count(),
                    page = self.cursor.page_number(),
                    "edit committed"
                );
                self.request_render();
                true
            }
        };

        Ok(EditReport {
            operation,
            committed,
            page: acted_page,
            cursor: self.cursor,
        })
    }

    /// Wait for the pending render and apply it if it is still the latest.
    ///
    /// Cancellation resolves to [`RenderStatus::Cancelled`], never to an
    /// error.
    pub async fn settle_render(&mut self) -> RenderStatus {
        let Some(pending) = self.pending_render.take() else {
            if self.cursor.is_empty() {
                return RenderStatus::NoPages;
            }
            return RenderStatus::Idle;
        };

        match pending.task.outcome().await {
            Ok(page)
                if pending.generation == self.render_generation
                    && page.page_number == self.cursor.page_number() =>
            {
                self.displayed = Some(page.clone());
                RenderStatus::Rendered(page)
            }
            Ok(page) => {
                debug!(page = page.page_number, "discarding stale render");
                RenderStatus::Cancelled
            }
            Err(err) if err.is_cancellation() => RenderStatus::Cancelled,
            Err(err) => {
                warn!(error = %err, "render failed");
                RenderStatus::Failed(err)
            }
        }
    }

    /// Cancel the pending render and start one for the current page.
    fn request_render(&mut self) {
        self.cancel_render();
        self.render_generation += 1;

        let Some(page) = self.cursor.current() else {
            self.displayed = None;
            return;
        };

        let task = RenderTask::spawn(self.render_handle.clone(), page, self.render_scale);
        self.pending_render = Some(PendingRender {
            generation: self.render_generation,
            task,
        });
    }

    fn cancel_render(&mut self) {
        if let Some(pending) = self.pending_render.take() {
            debug!(page = pending.task.page_number(), "cancelling render");
            pending.task.cancel();
        }
    }

    /// Tear the session down, cancelling any pending render.
    pub fn close(mut self) {
        self.cancel_render();
        info!(document = %self.document_name, "editor closed");
    }
}

impl<M: DocumentMutator, R: DocumentRenderer> Drop for EditSession<M, R> {
    fn drop(&mut self) {
        self.cancel_render();
    }
}

impl<M: DocumentMutator, R: DocumentRenderer> std::fmt::Debug for EditSession<M, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("target_index", &self.target_index)
            .field("document_name", &self.document_name)
            .field("cursor", &self.cursor)
            .field("compression_disabled", &self.compression_disabled)
            .field("render_generation", &self.render_generation)
            .finish_non_exhaustive()
    }
}
