//! Page cursor bookkeeping for the edit session.

use std::fmt;

use crate::error::{Result, ValidationError};

/// One step of page navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    /// Towards page 1.
    Previous,
    /// Towards the last page.
    Next,
}

/// Current page within a document of known length.
///
/// Holds a 1-based page number in `[1, page_count]`, or 0 when the document
/// has no pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    current: usize,
    count: usize,
}

impl PageCursor {
    /// Cursor on page 1 of a `count`-page document.
    pub fn new(count: usize) -> Self {
        Self {
            current: usize::from(count > 0),
            count,
        }
    }

    /// Current page, or `None` when there are no pages.
    pub fn current(&self) -> Option<usize> {
        (self.current > 0).then_some(self.current)
    }

    /// Current page number, 0 when there are no pages.
    pub fn page_number(&self) -> usize {
        self.current
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.count
    }

    /// Whether the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether a step in this direction would move.
    pub fn can_step(&self, step: PageStep) -> bool {
        match step {
            PageStep::Previous => self.current > 1,
            PageStep::Next => self.current < self.count,
        }
    }

    /// Move one page. Returns whether the cursor moved.
    pub fn step(&mut self, step: PageStep) -> bool {
        if !self.can_step(step) {
            return false;
        }
        match step {
            PageStep::Previous => self.current -= 1,
            PageStep::Next => self.current += 1,
        }
        true
    }

    /// Jump to a 1-based page. Returns whether the cursor moved.
    pub fn go_to(&mut self, page: usize) -> Result<bool> {
        if page == 0 || page > self.count {
            return Err(ValidationError::PageOutOfRange {
                page,
                page_count: self.count,
            }
            .into());
        }
        let moved = page != self.current;
        self.current = page;
        Ok(moved)
    }

    /// Adopt a new page count, clamping the current page into range.
    pub fn reconcile(&mut self, count: usize) {
        self.count = count;
        self.current = match count {
            0 => 0,
            _ => self.current.clamp(1, count),
        };
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current() {
            Some(page) => write!(f, "Page {page} of {}", self.count),
            None => write!(f, "No pages"),
        }
    }
}
