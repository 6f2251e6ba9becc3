//! Filesystem input and output.

pub mod reader;
pub mod writer;

pub use reader::{LoadResult, LoadStatistics, LoadedSource, SourceReader};
pub use writer::{PdfWriter, WriteStatistics};
