//! Reading source PDFs from disk.
//!
//! Files are read whole into memory; each becomes a [`PendingDocument`]
//! whose content is the original bytes. When verification is enabled the
//! bytes are also parsed once so that broken files are reported at load time
//! instead of on first edit.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmend::io::reader::SourceReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = SourceReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let (results, stats) = reader.load_all(&paths, 4).await;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, warn};

use crate::backend::{DocumentMutator, LopdfMutator, MutableDocument};
use crate::document::{PendingDocument, SourceFile};
use crate::error::{PdfMendError, Result};
use crate::utils::format_file_size;

/// A source file read from disk.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// The pending document built from the file.
    pub document: PendingDocument,

    /// Number of pages, when the file was verified.
    pub page_count: Option<usize>,

    /// Time taken to read (and verify) the file.
    pub load_time: Duration,
}

impl LoadedSource {
    /// File size in bytes.
    pub fn file_size(&self) -> u64 {
        self.document.byte_len()
    }
}

/// Result of a load operation (success or failure).
pub type LoadResult = Result<LoadedSource>;

/// Statistics for a batch load operation.
#[derive(Debug, Clone, Default)]
pub struct LoadStatistics {
    /// Number of files successfully loaded.
    pub success_count: usize,

    /// Number of files that failed to load.
    pub failure_count: usize,

    /// Total time taken for all loads.
    pub total_time: Duration,

    /// Average time per successful load.
    pub average_time: Duration,

    /// Total size of successfully loaded files.
    pub total_size: u64,

    /// Total number of verified pages.
    pub total_pages: usize,
}

impl LoadStatistics {
    fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut stats = Self {
            total_time,
            ..Self::default()
        };
        let mut total_load_time = Duration::ZERO;

        for result in results {
            match result {
                Ok(loaded) => {
                    stats.success_count += 1;
                    stats.total_size += loaded.file_size();
                    stats.total_pages += loaded.page_count.unwrap_or(0);
                    total_load_time += loaded.load_time;
                }
                Err(_) => stats.failure_count += 1,
            }
        }

        if stats.success_count > 0 {
            stats.average_time = total_load_time / stats.success_count as u32;
        }

        stats
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Reads PDF files into pending documents.
#[derive(Debug, Clone)]
pub struct SourceReader {
    /// Whether to parse the bytes after reading.
    verify: bool,
}

impl SourceReader {
    /// Create a reader that verifies each file.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that only reads bytes.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Load a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist or is not a regular file
    /// - The file cannot be read
    /// - Verification is on and the bytes are not a readable PDF
    pub async fn load(&self, path: &Path) -> Result<LoadedSource> {
        let start = Instant::now();

        let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PdfMendError::file_not_found(path.to_path_buf()),
            _ => PdfMendError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        if !metadata.is_file() {
            return Err(PdfMendError::not_a_file(path.to_path_buf()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PdfMendError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            })?;

        let document = PendingDocument::from_source(SourceFile::new(path.to_path_buf(), bytes));

        let page_count = if self.verify {
            let bytes = document.bytes().clone();
            let count = task::spawn_blocking(move || {
                LopdfMutator::new()
                    .open(&bytes)
                    .map(|doc| doc.page_count())
            })
            .await
            .map_err(|e| PdfMendError::other(format!("Load task failed: {e}")))?
            .map_err(|e| e.with_document_name(document.name()))?;
            Some(count)
        } else {
            None
        };

        debug!(
            path = %path.display(),
            bytes = document.byte_len(),
            pages = ?page_count,
            "source loaded"
        );

        Ok(LoadedSource {
            document,
            page_count,
            load_time: start.elapsed(),
        })
    }

    /// Load several files with up to `workers` reads in flight.
    ///
    /// Results are returned in input order.
    pub async fn load_all(
        &self,
        paths: &[PathBuf],
        workers: usize,
    ) -> (Vec<LoadResult>, LoadStatistics) {
        use futures::stream::{self, StreamExt};

        let start = Instant::now();
        let workers = workers.max(1);

        let results: Vec<LoadResult> = stream::iter(paths)
            .map(|path| async move {
                let result = self.load(path).await;
                if let Err(err) = &result {
                    warn!(path = %path.display(), error = %err, "failed to load source");
                }
                result
            })
            .buffered(workers)
            .collect()
            .await;

        let stats = LoadStatistics::from_results(&results, start.elapsed());
        (results, stats)
    }
}

impl Default for SourceReader {
    fn default() -> Self {
        Self::new()
    }
}
