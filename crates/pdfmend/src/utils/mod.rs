//! Utilities for path collection, naming and size formatting.

use crate::{Result, error::PdfMendError};
use std::path::{Path, PathBuf};

/// File name used when several documents are merged.
pub const MERGED_FILE_NAME: &str = "merged-document.pdf";

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`. A pattern without glob
/// metacharacters that matches nothing is kept as-is so that a missing file
/// is reported by the reader rather than silently dropped.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let pattern = pattern.as_ref();
        let paths = collect_paths_for_pattern(pattern)?;

        if paths.is_empty() && !has_glob_meta(pattern) {
            resolved_paths.push(PathBuf::from(pattern));
        } else {
            resolved_paths.extend(paths);
        }
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern).map_err(|err| PdfMendError::Other {
        message: format!("Invalid pattern '{pattern}': {err}"),
    })?;

    for entry in paths {
        let path = entry.map_err(|err| PdfMendError::Other {
            message: err.to_string(),
        })?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Whether a path names a PDF file (by extension, case-insensitive).
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Strip a trailing `.pdf` (any case) from a display name.
pub fn document_stem(name: &str) -> &str {
    let split = name.len().saturating_sub(4);
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(".pdf") => stem,
        _ => name,
    }
}

/// Suggested file name when a single document is processed on its own.
pub fn processed_file_name(name: &str) -> String {
    format!("{}-processed.pdf", document_stem(name))
}

/// Format a byte count as a human-readable string.
///
/// Uses 1024-based units with at most two decimals and no trailing zeros,
/// e.g. `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    const K: f64 = 1024.0;

    if size == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = size as f64;
    let mut unit = 0;
    while value >= K && unit < UNITS.len() - 1 {
        value /= K;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
