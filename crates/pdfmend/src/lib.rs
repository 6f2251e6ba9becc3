//! pdfmend - Combine PDF files and make small edits before saving.
//!
//! This library keeps an ordered list of pending PDF documents, lets one of
//! them at a time be opened for editing, and produces a single output file
//! from the list. It supports:
//!
//! - Rotating, cropping and deleting pages
//! - Removing annotations and document metadata
//! - Compressing a document
//! - Cancellable page previews
//! - Merging the list into one document, or re-saving a single one
//!
//! Every edit runs a full reconciliation cycle: the stored bytes are
//! re-opened, mutated, serialized and replaced in one step, so a failed edit
//! never leaves a document half-changed.
//!
//! # Examples
//!
//! ## Merge
//!
//! ```no_run
//! use pdfmend::io::{PdfWriter, SourceReader};
//! use pdfmend::Workspace;
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = SourceReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let (results, _stats) = reader.load_all(&paths, 4).await;
//!
//! let mut workspace = Workspace::new();
//! for loaded in results {
//!     workspace.add_document(loaded?.document);
//! }
//!
//! let output = workspace.process().await?;
//! PdfWriter::new()
//!     .write(output.bytes, Path::new(&output.file_name))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Edit
//!
//! ```no_run
//! use pdfmend::session::PageStep;
//! use pdfmend::Workspace;
//!
//! # async fn example(mut workspace: Workspace) -> pdfmend::Result<()> {
//! workspace.open_for_editing(0).await?;
//! workspace.navigate(PageStep::Next)?;
//! workspace.crop(36.0, 36.0, 18.0, 18.0).await?;
//! workspace.delete_page(0).await?;
//! workspace.commit_and_close()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod render;
pub mod session;
pub mod utils;
pub mod workspace;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use document::{DocumentContent, DocumentList, PendingDocument};
pub use error::{ErrorKind, PdfMendError, Result, ValidationError};
pub use output::{Notice, NoticeLevel};
pub use session::{EditOperation, EditReport, EditSession, PageStep, RenderStatus};
pub use workspace::Workspace;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
