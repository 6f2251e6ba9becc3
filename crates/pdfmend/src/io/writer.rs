//! Writing finished PDF bytes to disk.
//!
//! Output goes to a temporary sibling file first and is then renamed over
//! the target, so a failed write never leaves a truncated PDF behind.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmend::io::writer::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! let stats = writer.write(&*bytes, Path::new("merged-document.pdf")).await?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::task;
use tracing::debug;

use crate::error::{PdfMendError, Result};
use crate::utils::format_file_size;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes PDF bytes to files.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    atomic: bool,
}

impl PdfWriter {
    /// Create a writer that writes atomically.
    pub fn new() -> Self {
        Self { atomic: true }
    }

    /// Create a writer that writes straight to the target path.
    pub fn non_atomic() -> Self {
        Self { atomic: false }
    }

    /// Write `bytes` to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, written or renamed
    /// into place.
    pub async fn write(&self, bytes: impl Into<Arc<[u8]>>, path: &Path) -> Result<WriteStatistics> {
        let bytes: Arc<[u8]> = bytes.into();
        let path_buf = path.to_path_buf();
        let atomic = self.atomic;

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();

            if atomic {
                write_atomic(&bytes, &path_buf)?;
            } else {
                write_direct(&bytes, &path_buf)?;
            }

            Ok::<_, PdfMendError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| PdfMendError::other(format!("Write task failed: {e}")))??;

        debug!(path = %stats.output_path.display(), bytes = stats.file_size, "output written");
        Ok(stats)
    }

    /// Check that the parent directory of `path` exists and is writable.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PdfMendError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            )),
            _ => PdfMendError::FileNotAccessible {
                path: parent.to_path_buf(),
                source: e,
            },
        })?;

        if metadata.permissions().readonly() {
            return Err(PdfMendError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

/// Write into a uniquely named sibling temporary file, then persist it over
/// `path`. The temporary file is removed if anything fails.
fn write_atomic(bytes: &[u8], path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
        PdfMendError::FailedToCreateOutput {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    temp.write_all(bytes)
        .and_then(|()| temp.flush())
        .map_err(|e| PdfMendError::FailedToWrite {
            path: temp.path().to_path_buf(),
            source: e,
        })?;

    temp.persist(path).map_err(|e| PdfMendError::FailedToWrite {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

fn write_direct(bytes: &[u8], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| PdfMendError::FailedToCreateOutput {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| PdfMendError::FailedToWrite {
            path: path.to_path_buf(),
            source: e,
        })
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}
