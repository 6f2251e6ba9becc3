//! Producing the final document from the pending list.
//!
//! One document is re-serialized on its own and suggested as
//! `"{stem}-processed.pdf"`. Several documents are merged into one, pages
//! concatenated in list order, and suggested as `"merged-document.pdf"`.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmend::document::DocumentList;
//! use pdfmend::merge::process_documents;
//!
//! # async fn example(documents: DocumentList) -> pdfmend::Result<()> {
//! let output = process_documents(&documents).await?;
//! println!(
//!     "{}: {} pages from {} document(s)",
//!     output.file_name, output.page_count, output.source_count
//! );
//! # Ok(())
//! # }
//! ```

mod pages;

use ::lopdf::Document;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, info, instrument};

use crate::backend::lopdf::load_document;
use crate::document::DocumentList;
use crate::error::{PdfMendError, Result};
use crate::output::Notice;
use crate::utils::{MERGED_FILE_NAME, format_file_size, processed_file_name};

/// How the output was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    /// One document, re-serialized.
    Single,
    /// Several documents merged.
    Merged,
}

/// The finished document.
#[derive(Debug, Clone)]
pub struct ProcessedOutput {
    /// Serialized PDF.
    pub bytes: Vec<u8>,

    /// Suggested file name.
    pub file_name: String,

    /// Pages in the output.
    pub page_count: usize,

    /// Number of documents that went in.
    pub source_count: usize,

    /// Time taken to build the output.
    pub process_time: Duration,

    /// Single or merged.
    pub mode: ProcessMode,
}

impl ProcessedOutput {
    /// Success notice for this output.
    pub fn notice(&self) -> Notice {
        match self.mode {
            ProcessMode::Single => Notice::success("PDF processed successfully!"),
            ProcessMode::Merged => Notice::success("PDFs merged successfully!"),
        }
    }

    /// Format output size as human-readable string.
    pub fn format_size(&self) -> String {
        format_file_size(self.bytes.len() as u64)
    }
}

/// Build the final document from `documents`.
///
/// # Errors
///
/// Returns an error if:
/// - The list is empty
/// - A document cannot be loaded (the error names it)
/// - The merged page tree cannot be built
/// - The output cannot be serialized
#[instrument(skip_all, fields(documents = documents.len()))]
pub async fn process_documents(documents: &DocumentList) -> Result<ProcessedOutput> {
    if documents.is_empty() {
        return Err(PdfMendError::NoFilesToProcess);
    }

    let sources: Vec<(String, Arc<[u8]>)> = documents
        .iter()
        .map(|doc| (doc.name().to_string(), Arc::clone(doc.bytes())))
        .collect();

    let output = task::spawn_blocking(move || build_output(&sources))
        .await
        .map_err(|e| PdfMendError::other(format!("Process task failed: {e}")))??;

    info!(
        file = %output.file_name,
        pages = output.page_count,
        size = %output.format_size(),
        "output ready"
    );
    Ok(output)
}

fn build_output(sources: &[(String, Arc<[u8]>)]) -> Result<ProcessedOutput> {
    let start = Instant::now();

    let (mut document, file_name, mode) = match sources {
        [] => return Err(PdfMendError::NoFilesToProcess),
        [(name, bytes)] => (
            load_named(name, bytes)?,
            processed_file_name(name),
            ProcessMode::Single,
        ),
        _ => (
            merge_sources(sources)?,
            MERGED_FILE_NAME.to_string(),
            ProcessMode::Merged,
        ),
    };

    let page_count = document.get_pages().len();
    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|e| PdfMendError::serialize(e.to_string()))?;

    Ok(ProcessedOutput {
        bytes,
        file_name,
        page_count,
        source_count: sources.len(),
        process_time: start.elapsed(),
        mode,
    })
}

fn load_named(name: &str, bytes: &[u8]) -> Result<Document> {
    load_document(bytes).map_err(|e| e.with_document_name(name))
}

/// Concatenate the pages of every source, in order, into one document.
fn merge_sources(sources: &[(String, Arc<[u8]>)]) -> Result<Document> {
    let mut iter = sources.iter();
    let Some((first_name, first_bytes)) = iter.next() else {
        return Err(PdfMendError::NoFilesToProcess);
    };

    let mut merged = load_named(first_name, first_bytes)?;
    pages::detach_pages(&mut merged)?;
    let mut max_id = merged.max_id;

    for (name, bytes) in iter {
        let mut doc = load_named(name, bytes)?;
        pages::detach_pages(&mut doc)?;

        // Renumber objects to avoid ID conflicts
        doc.renumber_objects_with(max_id + 1);
        max_id = doc.max_id;

        let page_ids: Vec<_> = doc.get_pages().into_values().collect();
        debug!(document = %name, pages = page_ids.len(), "appending pages");

        merged.objects.extend(doc.objects);
        pages::add_pages_to_tree(&mut merged, &page_ids)?;
    }

    merged.max_id = max_id;

    // Drops the catalogs and page tree nodes of the appended documents.
    merged.prune_objects();
    merged.renumber_objects();

    Ok(merged)
}
