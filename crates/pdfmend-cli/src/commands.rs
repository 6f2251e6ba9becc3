//! Translation of command-line arguments into library calls.
//!
//! Edit steps are written as `name` or `name=ARGS`, the same way on the
//! command line (`--op crop=10,10,5,5`) and in the interactive shell
//! (`crop 10 10 5 5`).

use anyhow::{Context, Result, anyhow, bail};
use std::path::PathBuf;

use crate::cli::{LoadArgs, OutputArgs};
use pdfmend::Config;
use pdfmend::config::OverwriteMode;
use pdfmend::session::CropMargins;
use pdfmend::{EditOperation, PageStep};

/// One step of an editing run.
#[derive(Debug, Clone, PartialEq)]
pub enum EditStep {
    /// An edit with a fixed target.
    Edit(EditOperation),
    /// Delete whatever page the cursor is on when the step runs.
    DeleteCurrentPage,
    /// Move the page cursor.
    Navigate(PageStep),
    /// Jump to a 1-based page.
    GoTo(usize),
}

impl EditStep {
    /// Parse `name` or `name=ARGS`.
    pub fn parse(text: &str) -> Result<Self> {
        let (name, args) = match text.split_once('=') {
            Some((name, args)) => (name.trim(), Some(args.trim())),
            None => (text.trim(), None),
        };

        let step = match (name, args) {
            ("rotate-left", None) => Self::Edit(EditOperation::rotate_left()),
            ("rotate-right", None) => Self::Edit(EditOperation::rotate_right()),
            ("rotate", Some(args)) => {
                let degrees = args
                    .parse()
                    .with_context(|| format!("Invalid rotation '{args}'"))?;
                Self::Edit(EditOperation::Rotate { degrees })
            }
            ("crop", Some(args)) => Self::Edit(EditOperation::Crop(parse_margins(args)?)),
            ("delete-page", None) => Self::DeleteCurrentPage,
            ("strip-annotations", None) => Self::Edit(EditOperation::StripAnnotations),
            ("strip-metadata", None) => Self::Edit(EditOperation::StripMetadata),
            ("compress", None) => Self::Edit(EditOperation::Compress),
            ("next", None) => Self::Navigate(PageStep::Next),
            ("prev", None) => Self::Navigate(PageStep::Previous),
            ("page", Some(args)) => {
                let page = args
                    .parse()
                    .with_context(|| format!("Invalid page number '{args}'"))?;
                Self::GoTo(page)
            }
            (name, Some(_)) if is_known(name) => bail!("'{name}' takes no arguments"),
            (name, None) if is_known(name) => bail!("'{name}' needs arguments: {name}=..."),
            (name, _) => bail!("Unknown operation '{name}'"),
        };

        Ok(step)
    }

    /// Parse a list of steps, failing on the first bad one.
    pub fn parse_all<T: AsRef<str>>(texts: &[T]) -> pdfmend::Result<Vec<Self>> {
        texts
            .iter()
            .map(|text| Self::parse(text.as_ref()))
            .collect::<Result<_>>()
            .map_err(|e| pdfmend::PdfMendError::invalid_config(e.to_string()))
    }
}

fn is_known(name: &str) -> bool {
    matches!(
        name,
        "rotate-left"
            | "rotate-right"
            | "rotate"
            | "crop"
            | "delete-page"
            | "strip-annotations"
            | "strip-metadata"
            | "compress"
            | "next"
            | "prev"
            | "page"
    )
}

fn parse_margins(args: &str) -> Result<CropMargins> {
    let values = args
        .split(',')
        .map(|value| {
            value
                .trim()
                .parse::<f32>()
                .map_err(|_| anyhow!("Invalid crop margin '{}'", value.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    match values[..] {
        [top, bottom, left, right] => Ok(CropMargins::new(top, bottom, left, right)),
        _ => bail!("Crop needs four margins: crop=TOP,BOTTOM,LEFT,RIGHT"),
    }
}

/// Build the run configuration from parsed arguments.
///
/// Inputs are resolved separately; this fills in everything else.
pub fn build_config(
    inputs: Vec<PathBuf>,
    output: &OutputArgs,
    load: &LoadArgs,
    render_scale: f32,
    verbose: bool,
    quiet: bool,
) -> Config {
    let overwrite_mode = if output.force {
        OverwriteMode::Force
    } else if output.no_clobber {
        OverwriteMode::NoClobber
    } else {
        OverwriteMode::Prompt
    };

    Config {
        inputs,
        output: output.output.clone(),
        output_dir: output.output_dir.clone(),
        verbose,
        overwrite_mode,
        quiet,
        render_scale,
        continue_on_error: load.continue_on_error,
        jobs: load.jobs,
    }
}
