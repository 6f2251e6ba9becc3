//! Error types for pdfmend.
//!
//! Every fallible operation in the library returns [`PdfMendError`]. The
//! variants fall into a small taxonomy (see [`ErrorKind`]) that front ends
//! use to decide how to present a failure:
//!
//! - **Load**: bytes are not a valid PDF document
//! - **Serialize**: an edited document could not be written back to bytes
//! - **Render**: a page preview failed for a reason other than cancellation
//! - **Validation**: caller-supplied parameters were rejected before any
//!   mutation was attempted
//! - **Io** / **Other**: filesystem and miscellaneous failures
//!
//! A cancelled render is reported as [`PdfMendError::RenderCancelled`] so
//! that callers can tell it apart from a real failure with
//! [`PdfMendError::is_cancellation`].

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfmend operations.
pub type Result<T> = std::result::Result<T, PdfMendError>;

/// Broad category of a [`PdfMendError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bytes could not be opened as a document.
    Load,
    /// A mutated document could not be written back.
    Serialize,
    /// Rendering failed (cancellation excluded).
    Render,
    /// Rendering was cancelled; not a failure.
    Cancelled,
    /// Parameters rejected before any mutation.
    Validation,
    /// Filesystem failure.
    Io,
    /// Anything else.
    Other,
}

/// Parameters or state rejected before a mutation is attempted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Crop margins consume the whole page.
    #[error(
        "Invalid crop dimensions: left + right ({horizontal}) must be less than the page width ({width}) \
         and top + bottom ({vertical}) less than the page height ({height})"
    )]
    InvalidCrop {
        /// Sum of the left and right margins.
        horizontal: f32,
        /// Sum of the top and bottom margins.
        vertical: f32,
        /// Page width.
        width: f32,
        /// Page height.
        height: f32,
    },

    /// A crop margin was negative.
    #[error("Crop margins must not be negative")]
    NegativeMargin,

    /// Rotation delta is not a quarter turn.
    #[error("Rotation must be a multiple of 90 degrees, got {degrees}")]
    InvalidRotation {
        /// Requested rotation delta.
        degrees: i32,
    },

    /// Attempt to delete the last remaining page.
    #[error("Cannot delete the only page")]
    OnlyPage,

    /// Compression requested after metadata was stripped in this session.
    #[error("Cannot compress PDF after metadata has been removed")]
    CompressionDisabled,

    /// Page index outside the document.
    #[error("Page {page} does not exist (document has {page_count} page(s))")]
    PageOutOfRange {
        /// 1-based page number that was requested.
        page: usize,
        /// Pages in the document.
        page_count: usize,
    },

    /// Document index outside the pending list.
    #[error("No document at position {position} (list has {len} document(s))")]
    IndexOutOfRange {
        /// 1-based list position that was requested.
        position: usize,
        /// Documents in the list.
        len: usize,
    },

    /// The operation needs a page but the document has none.
    #[error("Document has no pages")]
    NoPages,

    /// The list cannot be reordered while a document is being edited.
    #[error("Close the editor before reordering or removing documents")]
    SessionActive,

    /// The operation needs an open edit session.
    #[error("No document is open for editing")]
    NoActiveSession,
}

/// Main error type for pdfmend operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfMendError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Bytes could not be opened as a PDF document.
    #[error("Failed to load PDF: {name}\n  Reason: {reason}")]
    Load {
        /// Display name of the document.
        name: String,
        /// Reason reported by the PDF library.
        reason: String,
    },

    /// An edited document could not be written back to bytes.
    #[error("Failed to save PDF changes: {reason}")]
    Serialize {
        /// Reason reported by the PDF library.
        reason: String,
    },

    /// A page preview could not be rendered.
    #[error("Failed to render page {page}: {reason}")]
    Render {
        /// 1-based page number.
        page: usize,
        /// What went wrong.
        reason: String,
    },

    /// A page render was superseded or the editor closed.
    #[error("Rendering of page {page} was cancelled")]
    RenderCancelled {
        /// 1-based page number.
        page: usize,
    },

    /// Parameters or state rejected before any mutation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The document structure did not allow the requested edit.
    #[error("Edit failed: {reason}")]
    EditFailed {
        /// What went wrong.
        reason: String,
    },

    /// Building the merged document failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// What went wrong.
        reason: String,
    },

    /// Nothing to process.
    #[error("No PDF documents selected")]
    NoFilesToProcess,

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create the output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfMendError {
    fn from(err: lopdf::Error) -> Self {
        Self::edit_failed(err.to_string())
    }
}

impl PdfMendError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a Load error.
    pub fn load(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a Serialize error.
    pub fn serialize(reason: impl Into<String>) -> Self {
        Self::Serialize {
            reason: reason.into(),
        }
    }

    /// Create a Render error.
    pub fn render(page: usize, reason: impl Into<String>) -> Self {
        Self::Render {
            page,
            reason: reason.into(),
        }
    }

    /// Create an EditFailed error.
    pub fn edit_failed(reason: impl Into<String>) -> Self {
        Self::EditFailed {
            reason: reason.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Attach a document name to a load error; other errors pass through.
    pub fn with_document_name(self, name: &str) -> Self {
        match self {
            Self::Load { reason, .. } => Self::Load {
                name: name.to_string(),
                reason,
            },
            other => other,
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load { .. } => ErrorKind::Load,
            Self::Serialize { .. } => ErrorKind::Serialize,
            Self::Render { .. } => ErrorKind::Render,
            Self::RenderCancelled { .. } => ErrorKind::Cancelled,
            Self::Validation(_) => ErrorKind::Validation,
            Self::FileNotFound { .. }
            | Self::NotAFile { .. }
            | Self::FileNotAccessible { .. }
            | Self::FailedToCreateOutput { .. }
            | Self::FailedToWrite { .. }
            | Self::Io { .. } => ErrorKind::Io,
            _ => ErrorKind::Other,
        }
    }

    /// The validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// True when a render was cancelled rather than failed.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::RenderCancelled { .. })
    }

    /// Check if this error is recoverable (the session or batch can continue).
    ///
    /// Session-level failures abort only the current operation and leave
    /// committed state untouched.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Load { .. }
                | Self::Serialize { .. }
                | Self::Render { .. }
                | Self::RenderCancelled { .. }
                | Self::Validation(_)
                | Self::EditFailed { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoFilesToProcess
                | Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::Cancelled
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::Load { .. } => 3,
            Self::Serialize { .. } => 6,
            Self::Render { .. } => 6,
            Self::RenderCancelled { .. } => 0,
            Self::Validation(_) => 1,
            Self::EditFailed { .. } => 6,
            Self::MergeFailed { .. } => 6,
            Self::NoFilesToProcess => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
