//! CLI argument parsing for pdfmend.
//!
//! This module defines the command-line interface structure using `clap`.
//! It is also compiled by the build script to generate the man page, so it
//! depends on nothing but `clap` and the standard library.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Combine PDF files and make small edits before saving.
///
/// pdfmend merges several PDFs into one document, or re-saves a single PDF,
/// after optional page-level edits: rotate, crop, delete pages, remove
/// annotations or metadata, and compress.
#[derive(Parser, Debug)]
#[command(name = "pdfmend")]
#[command(version)]
#[command(about = "Combine PDF files and make small edits before saving", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// What to do
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output - show timings, sizes and page previews
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed.
    /// Useful for scripts and automation.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge several PDFs, or re-save a single one
    ///
    /// One input produces "<name>-processed.pdf"; several inputs are merged
    /// in the order given into "merged-document.pdf".
    ///
    /// Examples:
    ///   pdfmend process scan.pdf
    ///   pdfmend process chapter*.pdf -o book.pdf
    Process(ProcessArgs),

    /// Apply edits to one PDF and save the result
    ///
    /// Operations run in the order given:
    ///   rotate-left, rotate-right, rotate=DEG,
    ///   crop=TOP,BOTTOM,LEFT,RIGHT, delete-page,
    ///   strip-annotations, strip-metadata, compress,
    ///   next, prev, page=N
    ///
    /// Examples:
    ///   pdfmend edit scan.pdf --op rotate-right --op next --op delete-page
    ///   pdfmend edit report.pdf --op strip-metadata -o clean.pdf
    Edit(EditArgs),

    /// Show the documents that would be processed
    List(ListArgs),

    /// Interactive session: add, reorder, edit and process documents
    Shell(ShellArgs),
}

/// Where and how the output file is written.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output PDF file path
    ///
    /// Overrides the suggested file name and --output-dir.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory for the suggested output file name
    #[arg(
        short = 'd',
        long,
        value_name = "DIR",
        default_value = ".",
        conflicts_with = "output"
    )]
    pub output_dir: PathBuf,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,
}

/// How input files are read.
#[derive(Args, Debug, Clone, Default)]
pub struct LoadArgs {
    /// Number of parallel jobs for loading PDFs
    ///
    /// Default is number of CPU cores. Use 1 for sequential loading.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Skip PDFs that fail to load instead of stopping
    #[arg(long)]
    pub continue_on_error: bool,
}

/// Arguments of `pdfmend process`.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input PDF files or glob patterns (in order)
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub load: LoadArgs,
}

/// Arguments of `pdfmend edit`.
#[derive(Args, Debug)]
pub struct EditArgs {
    /// PDF file to edit
    #[arg(value_name = "FILE")]
    pub input: String,

    /// Edit operation or navigation step (repeatable)
    #[arg(long = "op", value_name = "OP", required = true)]
    pub ops: Vec<String>,

    /// Delete pages without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Scale factor for page previews
    #[arg(long, value_name = "FACTOR", default_value_t = 1.5)]
    pub scale: f32,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments of `pdfmend list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Input PDF files or glob patterns
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub load: LoadArgs,
}

/// Arguments of `pdfmend shell`.
#[derive(Args, Debug)]
pub struct ShellArgs {
    /// PDF files or glob patterns to start with
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Scale factor for page previews
    #[arg(long, value_name = "FACTOR", default_value_t = 1.5)]
    pub scale: f32,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub load: LoadArgs,
}
