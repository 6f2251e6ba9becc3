//! Terminal rendering of notices and run summaries.
//!
//! Every line goes through [`OutputFormatter::shows`], which applies the
//! quiet and verbose switches per [`MessageLevel`], and [`format_line`],
//! which adds the level prefix and optional ANSI color.
//!
//! # Examples
//!
//! ```
//! use pdfmend::output::{Notice, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Loading documents...");
//! formatter.notify(&Notice::success("PDFs merged successfully!"));
//! ```

use crate::document::DocumentSummary;
use crate::output::{Notice, NoticeLevel};
use std::io::{self, IsTerminal};

/// Level of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Neutral progress text.
    Info,
    /// Completed operation.
    Success,
    /// Something was skipped.
    Warning,
    /// Failed operation.
    Error,
    /// Verbose-only detail.
    Debug,
}

impl MessageLevel {
    fn style(self) -> (&'static str, &'static str) {
        match self {
            Self::Info => ("", ""),
            Self::Success => ("✓ ", "\x1b[32m"),
            Self::Warning => ("⚠ ", "\x1b[33m"),
            Self::Error => ("✗ ", "\x1b[31m"),
            Self::Debug => ("→ ", "\x1b[36m"),
        }
    }
}

impl From<NoticeLevel> for MessageLevel {
    fn from(level: NoticeLevel) -> Self {
        match level {
            NoticeLevel::Info => Self::Info,
            NoticeLevel::Success => Self::Success,
            NoticeLevel::Error => Self::Error,
        }
    }
}

/// Prefix `message` for `level`, wrapped in its color when `colored`.
pub fn format_line(level: MessageLevel, message: &str, colored: bool) -> String {
    let (prefix, color) = level.style();
    if colored && !color.is_empty() {
        format!("{color}{prefix}{message}\x1b[0m")
    } else {
        format!("{prefix}{message}")
    }
}

/// Prints user-facing lines to stdout.
#[derive(Debug)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a formatter. Color is used when stdout is a terminal.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: io::stdout().is_terminal() && std::env::var_os("TERM").is_some(),
        }
    }

    /// Whether a line at `level` is printed.
    ///
    /// Warnings and errors always are. Info and success lines are dropped in
    /// quiet mode; debug lines need verbose mode.
    pub fn shows(&self, level: MessageLevel) -> bool {
        match level {
            MessageLevel::Info | MessageLevel::Success => !self.quiet,
            MessageLevel::Warning | MessageLevel::Error => true,
            MessageLevel::Debug => self.verbose,
        }
    }

    fn emit(&self, level: MessageLevel, message: &str) {
        if self.shows(level) {
            println!("{}", format_line(level, message, self.colored));
        }
    }

    /// Info line.
    pub fn info(&self, message: &str) {
        self.emit(MessageLevel::Info, message);
    }

    /// Success line.
    pub fn success(&self, message: &str) {
        self.emit(MessageLevel::Success, message);
    }

    /// Warning line, shown even when quiet.
    pub fn warning(&self, message: &str) {
        self.emit(MessageLevel::Warning, message);
    }

    /// Error line, always shown.
    pub fn error(&self, message: &str) {
        self.emit(MessageLevel::Error, message);
    }

    /// Verbose-only line.
    pub fn debug(&self, message: &str) {
        self.emit(MessageLevel::Debug, message);
    }

    /// Print a [`Notice`] at its own level.
    pub fn notify(&self, notice: &Notice) {
        self.emit(notice.level.into(), &notice.message);
    }

    /// Blank line then `title`. Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if self.should_print() {
            println!("\n{title}");
        }
    }

    /// Indented `label: value`. Verbose only.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Empty line. Suppressed in quiet mode.
    pub fn blank_line(&self) {
        if self.should_print() {
            println!();
        }
    }

    /// Numbered entry, `index` is 1-based. Suppressed in quiet mode.
    pub fn list_item(&self, index: usize, message: &str) {
        if self.should_print() {
            println!("  {index}. {message}");
        }
    }

    /// Print the pending document list, one line per document.
    pub fn document_list(&self, summaries: &[DocumentSummary]) {
        if summaries.is_empty() {
            self.info("No documents added.");
            return;
        }

        for summary in summaries {
            self.list_item(summary.position, &document_line(summary));
        }
    }

    /// False in quiet mode.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Whether verbose mode is on.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Whether quiet mode is on.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

fn document_line(summary: &DocumentSummary) -> String {
    let marker = if summary.edited { " (edited)" } else { "" };
    format!("{} ({}){marker}", summary.name, summary.size)
}
