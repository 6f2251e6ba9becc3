//! Edit operations and the document mutation each one performs.

use crate::backend::{CropRect, InfoField, MutableDocument};
use crate::error::{Result, ValidationError};

/// Info dictionary entries removed by [`EditOperation::StripMetadata`].
const REMOVED_INFO_ENTRIES: [&str; 3] = ["CreationDate", "ModDate", "Trapped"];

/// Margins trimmed from the current page, in PDF units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CropMargins {
    /// Trimmed from the top edge.
    pub top: f32,
    /// Trimmed from the bottom edge.
    pub bottom: f32,
    /// Trimmed from the left edge.
    pub left: f32,
    /// Trimmed from the right edge.
    pub right: f32,
}

impl CropMargins {
    /// Margins in top, bottom, left, right order.
    pub fn new(top: f32, bottom: f32, left: f32, right: f32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    fn values(&self) -> [f32; 4] {
        [self.top, self.bottom, self.left, self.right]
    }
}

/// A destructive edit applied through the session's reconciliation cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOperation {
    /// Rotate the current page by a multiple of 90 degrees (negative is
    /// counter-clockwise).
    Rotate {
        /// Rotation delta in degrees.
        degrees: i32,
    },
    /// Set the current page's crop box from margins.
    Crop(CropMargins),
    /// Remove a page.
    DeletePage {
        /// 0-based page index.
        page_index: usize,
    },
    /// Remove the annotations collection from every page.
    StripAnnotations,
    /// Blank the text metadata and drop the date and trapping entries.
    StripMetadata,
    /// Re-serialize with the mutator's size optimization.
    Compress,
}

/// Whether a mutation changed anything worth serializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mutation {
    Changed,
    Unchanged,
}

impl EditOperation {
    /// Quarter turn counter-clockwise.
    pub fn rotate_left() -> Self {
        Self::Rotate { degrees: -90 }
    }

    /// Quarter turn clockwise.
    pub fn rotate_right() -> Self {
        Self::Rotate { degrees: 90 }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rotate { .. } => "rotate",
            Self::Crop(_) => "crop",
            Self::DeletePage { .. } => "delete-page",
            Self::StripAnnotations => "strip-annotations",
            Self::StripMetadata => "strip-metadata",
            Self::Compress => "compress",
        }
    }

    /// Reject parameters that are invalid regardless of the document.
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Rotate { degrees } if degrees % 90 != 0 => {
                Err(ValidationError::InvalidRotation { degrees: *degrees }.into())
            }
            Self::Crop(margins)
                if margins
                    .values()
                    .iter()
                    .any(|value| !value.is_finite() || *value < 0.0) =>
            {
                Err(ValidationError::NegativeMargin.into())
            }
            _ => Ok(()),
        }
    }

    /// Apply this operation to `document`.
    ///
    /// `current_page` is the session's 1-based page (0 when empty). All
    /// document-dependent checks run before the first change.
    pub(crate) fn apply<D: MutableDocument>(
        &self,
        document: &mut D,
        current_page: usize,
    ) -> Result<Mutation> {
        match self {
            Self::Rotate { degrees } => {
                let index = page_index(document, current_page)?;
                let rotation = (document.rotation(index)? + degrees).rem_euclid(360);
                document.set_rotation(index, rotation)?;
                Ok(Mutation::Changed)
            }
            Self::Crop(margins) => {
                let index = page_index(document, current_page)?;
                let size = document.page_size(index)?;

                let horizontal = margins.left + margins.right;
                let vertical = margins.top + margins.bottom;
                if horizontal >= size.width || vertical >= size.height {
                    return Err(ValidationError::InvalidCrop {
                        horizontal,
                        vertical,
                        width: size.width,
                        height: size.height,
                    }
                    .into());
                }

                document.set_crop_box(
                    index,
                    CropRect {
                        x: margins.left,
                        y: margins.bottom,
                        width: size.width - horizontal,
                        height: size.height - vertical,
                    },
                )?;
                Ok(Mutation::Changed)
            }
            Self::DeletePage { page_index } => {
                let page_count = document.page_count();
                match page_count {
                    0 => return Err(ValidationError::NoPages.into()),
                    1 => return Err(ValidationError::OnlyPage.into()),
                    _ if *page_index >= page_count => {
                        return Err(ValidationError::PageOutOfRange {
                            page: page_index + 1,
                            page_count,
                        }
                        .into());
                    }
                    _ => {}
                }
                document.remove_page(*page_index)?;
                Ok(Mutation::Changed)
            }
            Self::StripAnnotations => {
                let mut removed = false;
                for index in 0..document.page_count() {
                    removed |= document.delete_annotations(index)?;
                }
                Ok(if removed {
                    Mutation::Changed
                } else {
                    Mutation::Unchanged
                })
            }
            Self::StripMetadata => {
                for field in InfoField::ALL {
                    document.set_info_field(field, "")?;
                }
                for key in REMOVED_INFO_ENTRIES {
                    document.remove_info_entry(key)?;
                }
                // Always dirty, even when the fields were already empty.
                Ok(Mutation::Changed)
            }
            Self::Compress => {
                document.optimize();
                Ok(Mutation::Changed)
            }
        }
    }
}

fn page_index<D: MutableDocument>(document: &D, current_page: usize) -> Result<usize> {
    if current_page == 0 || document.page_count() == 0 {
        return Err(ValidationError::NoPages.into());
    }
    Ok(current_page - 1)
}
