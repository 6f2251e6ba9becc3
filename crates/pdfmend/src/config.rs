//! Configuration module for pdfmend.
//!
//! This module turns CLI arguments into a validated configuration that
//! drives loading, editing and writing. It handles:
//! - Validation of argument combinations
//! - Application of defaults
//! - Resolution of the output path

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use crate::PdfMendError;

/// Scale applied to page previews when none is configured.
pub const DEFAULT_RENDER_SCALE: f32 = 1.5;

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a pdfmend run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input PDF file paths (in list order).
    pub inputs: Vec<PathBuf>,

    /// Explicit output file. Overrides `output_dir`.
    pub output: Option<PathBuf>,

    /// Directory receiving the suggested output file name.
    pub output_dir: PathBuf,

    /// Verbose output mode.
    pub verbose: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Scale factor for page previews.
    pub render_scale: f32,

    /// Skip inputs that fail to load instead of stopping.
    pub continue_on_error: bool,

    /// Number of parallel load workers (None = auto-detect).
    pub jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: None,
            output_dir: PathBuf::from("."),
            verbose: false,
            overwrite_mode: OverwriteMode::Prompt,
            quiet: false,
            render_scale: DEFAULT_RENDER_SCALE,
            continue_on_error: false,
            jobs: None,
        }
    }
}

impl Config {
    /// Validate the configuration for a run over input files.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - The output file is one of the inputs
    /// - Any check in [`Config::validate_options`] fails
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        self.validate_options()?;

        if let Some(output) = &self.output
            && self.inputs.iter().any(|input| input == output)
        {
            bail!(
                "Output file cannot be the same as an input file: {}",
                output.display()
            );
        }

        Ok(())
    }

    /// Validate everything except the input list.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The render scale is not a positive finite number
    pub fn validate_options(&self) -> Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        if !self.render_scale.is_finite() || self.render_scale <= 0.0 {
            bail!(
                "Render scale must be a positive number, got {}",
                self.render_scale
            );
        }

        Ok(())
    }

    /// [`Config::validate`], converted to the library error type.
    pub fn validated(self) -> crate::Result<Self> {
        self.validate()
            .map_err(|e| PdfMendError::invalid_config(e.to_string()))?;
        Ok(self)
    }

    /// Get the effective number of parallel jobs.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Where to write a result whose suggested file name is `suggested`.
    pub fn output_path_for(&self, suggested: &str) -> PathBuf {
        match &self.output {
            Some(output) => output.clone(),
            None => self.output_dir.join(suggested),
        }
    }

    /// Whether `path` is one of the inputs.
    pub fn is_input(&self, path: &Path) -> bool {
        self.inputs.iter().any(|input| input == path)
    }
}
