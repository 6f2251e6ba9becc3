//! User-facing messages and their display.
//!
//! Library operations describe their outcome as a [`Notice`]; front ends
//! decide how to show it. [`OutputFormatter`] is the terminal front end used
//! by the CLI.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmend::output::{Notice, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.notify(&Notice::success("PDF re-processed (basic optimization)."));
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::error::PdfMendError;
use crate::io::LoadStatistics;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information.
    Info,
    /// An operation succeeded.
    Success,
    /// An operation failed.
    Error,
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,

    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Notice for a failed operation.
    ///
    /// Returns `None` for a cancelled render, which is never shown.
    pub fn for_error(err: &PdfMendError) -> Option<Self> {
        if err.is_cancellation() {
            return None;
        }
        Some(Self::error(err.to_string()))
    }
}

/// Display load statistics to the user.
///
/// # Arguments
///
/// * `formatter` - Output formatter to use
/// * `stats` - Load statistics to display
pub fn display_load_statistics(formatter: &OutputFormatter, stats: &LoadStatistics) {
    if stats.failure_count > 0 {
        formatter.warning(&format!(
            "Warning: {} file(s) failed to load",
            stats.failure_count
        ));
    }

    formatter.info(&format!(
        "Loaded {} file(s) in {:.2}s: {} pages, {}",
        stats.success_count,
        stats.total_time.as_secs_f64(),
        stats.total_pages,
        stats.format_total_size()
    ));
}
