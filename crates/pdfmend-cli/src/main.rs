//! pdfmend - Combine PDF files and make small edits before saving.
//!
//! Command-line front end over the `pdfmend` library: batch processing,
//! scripted edits, listing, and an interactive shell.

mod cli;
mod commands;
mod shell;

use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, EditArgs, ListArgs, LoadArgs, OutputArgs, ProcessArgs};
use crate::commands::{EditStep, build_config};
use pdfmend::config::{Config, DEFAULT_RENDER_SCALE, OverwriteMode};
use pdfmend::error::PdfMendError;
use pdfmend::io::{LoadedSource, PdfWriter, SourceReader};
use pdfmend::merge::ProcessedOutput;
use pdfmend::output::{OutputFormatter, display_load_statistics};
use pdfmend::utils::{collect_paths_for_patterns, is_pdf_path};
use pdfmend::{Notice, RenderStatus, ValidationError, Workspace};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Run the application and handle errors
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PdfMendError> {
    let Cli {
        command,
        verbose,
        quiet,
    } = cli;

    match command {
        Command::Process(args) => run_process(args, verbose, quiet).await,
        Command::Edit(args) => run_edit(args, verbose, quiet).await,
        Command::List(args) => run_list(args, verbose, quiet).await,
        Command::Shell(args) => shell::run(args, verbose, quiet).await,
    }
}

async fn run_process(args: ProcessArgs, verbose: bool, quiet: bool) -> Result<(), PdfMendError> {
    let formatter = OutputFormatter::new(quiet, verbose);
    let inputs = resolve_inputs(&args.inputs, &formatter)?;
    let config = build_config(
        inputs,
        &args.output,
        &args.load,
        DEFAULT_RENDER_SCALE,
        verbose,
        quiet,
    )
    .validated()?;

    print_header(&formatter);

    let mut workspace = Workspace::from_config(&config);
    let sources = load_sources(&config, &formatter).await?;
    add_sources(&mut workspace, sources, &formatter);

    formatter.info("Processing documents...");
    let output = workspace.process().await?;
    write_output(&config, &formatter, output).await
}

async fn run_edit(args: EditArgs, verbose: bool, quiet: bool) -> Result<(), PdfMendError> {
    let formatter = OutputFormatter::new(quiet, verbose);
    let steps = EditStep::parse_all(&args.ops)?;

    let config = build_config(
        vec![PathBuf::from(&args.input)],
        &args.output,
        &LoadArgs::default(),
        args.scale,
        verbose,
        quiet,
    )
    .validated()?;

    print_header(&formatter);

    let mut workspace = Workspace::from_config(&config);
    let sources = load_sources(&config, &formatter).await?;
    add_sources(&mut workspace, sources, &formatter);

    workspace.open_for_editing(0).await?;
    report_render(&mut workspace, &formatter).await?;

    for step in steps {
        run_step(&mut workspace, step, &formatter, args.yes).await?;
    }

    let notice = workspace.commit_and_close()?;
    formatter.notify(&notice);

    let output = workspace.process().await?;
    write_output(&config, &formatter, output).await
}

async fn run_list(args: ListArgs, verbose: bool, quiet: bool) -> Result<(), PdfMendError> {
    // JSON goes to stdout alone.
    let formatter = OutputFormatter::new(quiet || args.json, verbose && !args.json);
    let inputs = resolve_inputs(&args.inputs, &formatter)?;
    let config = build_config(
        inputs,
        &OutputArgs::default(),
        &args.load,
        DEFAULT_RENDER_SCALE,
        verbose,
        quiet,
    )
    .validated()?;

    let mut workspace = Workspace::from_config(&config);
    let sources = load_sources(&config, &formatter).await?;
    let page_counts = add_sources(&mut workspace, sources, &formatter);
    let summaries = workspace.documents().summaries();

    if args.json {
        let entries = summaries
            .iter()
            .zip(&page_counts)
            .map(|(summary, pages)| {
                let mut entry = serde_json::to_value(summary)?;
                if let Some(object) = entry.as_object_mut() {
                    object.insert("pages".to_string(), serde_json::json!(pages));
                }
                Ok(entry)
            })
            .collect::<serde_json::Result<Vec<_>>>()
            .map_err(|e| PdfMendError::other(format!("Failed to encode list: {e}")))?;
        let text = serde_json::to_string_pretty(&entries)
            .map_err(|e| PdfMendError::other(format!("Failed to encode list: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    formatter.blank_line();
    for (summary, pages) in summaries.iter().zip(&page_counts) {
        let pages = pages.map_or_else(|| "? pages".to_string(), |n| format!("{n} pages"));
        formatter.list_item(
            summary.position,
            &format!("{} ({}, {pages})", summary.name, summary.size),
        );
    }

    Ok(())
}

fn print_header(formatter: &OutputFormatter) {
    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfmend::NAME, pdfmend::VERSION));
        formatter.blank_line();
    }
}

/// Expand glob patterns and keep only PDF files.
pub(crate) fn resolve_inputs<T: AsRef<str>>(
    patterns: &[T],
    formatter: &OutputFormatter,
) -> Result<Vec<PathBuf>, PdfMendError> {
    let paths = collect_paths_for_patterns(patterns)?;

    Ok(paths
        .into_iter()
        .filter(|path| {
            let keep = is_pdf_path(path);
            if !keep {
                formatter.warning(&format!("Skipping non-PDF file: {}", path.display()));
            }
            keep
        })
        .collect())
}

/// Read every configured input.
///
/// A failed load stops the run unless `continue_on_error` is set, in which
/// case the file is skipped with a warning.
pub(crate) async fn load_sources(
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<Vec<LoadedSource>, PdfMendError> {
    formatter.info(&format!("Loading {} file(s)...", config.inputs.len()));

    let reader = SourceReader::new();
    let (results, stats) = reader
        .load_all(&config.inputs, config.effective_jobs())
        .await;

    let mut sources = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(source) => sources.push(source),
            Err(err) if config.continue_on_error => {
                formatter.warning(&format!("Skipping: {err}"));
            }
            Err(err) => return Err(err),
        }
    }

    display_load_statistics(formatter, &stats);
    Ok(sources)
}

/// Add loaded files to the workspace list, skipping duplicates.
///
/// Returns the page counts of the documents that were added, in list order.
pub(crate) fn add_sources(
    workspace: &mut Workspace,
    sources: Vec<LoadedSource>,
    formatter: &OutputFormatter,
) -> Vec<Option<usize>> {
    let mut page_counts = Vec::with_capacity(sources.len());

    for source in sources {
        let name = source.document.name().to_string();
        if workspace.add_document(source.document) {
            formatter.debug(&format!("Added {name}"));
            page_counts.push(source.page_count);
        } else {
            formatter.warning(&format!("Skipping duplicate: {name}"));
        }
    }

    page_counts
}

/// Run one edit step against the open session and report the outcome.
///
/// `assume_yes` skips the delete confirmation.
pub(crate) async fn run_step(
    workspace: &mut Workspace,
    step: EditStep,
    formatter: &OutputFormatter,
    assume_yes: bool,
) -> Result<(), PdfMendError> {
    match step {
        EditStep::Edit(operation) => {
            let report = workspace.apply_edit(operation).await?;
            formatter.notify(&report.notice());
        }
        EditStep::DeleteCurrentPage => {
            let page = workspace
                .session()
                .map(|session| session.current_page())
                .ok_or(ValidationError::NoActiveSession)?;
            if page == 0 {
                return Err(ValidationError::NoPages.into());
            }
            if !assume_yes {
                confirm(
                    &format!(
                        "Are you sure you want to delete page {page}? This action cannot be undone."
                    ),
                    formatter,
                )?;
            }
            let report = workspace.delete_current_page().await?;
            formatter.notify(&report.notice());
        }
        EditStep::Navigate(direction) => {
            if !workspace.navigate(direction)? {
                formatter.debug("Already at the end of the document");
            }
        }
        EditStep::GoTo(page) => {
            workspace.go_to_page(page)?;
        }
    }

    report_render(workspace, formatter).await
}

/// Wait for the preview of the current page and describe it.
pub(crate) async fn report_render(
    workspace: &mut Workspace,
    formatter: &OutputFormatter,
) -> Result<(), PdfMendError> {
    let Some(cursor) = workspace.session().map(|session| session.cursor()) else {
        return Ok(());
    };

    match workspace.settle_render().await? {
        RenderStatus::Rendered(page) => {
            formatter.info(&cursor.to_string());
            formatter.debug(&format!(
                "Preview {}x{} px at {}x, rotation {}, {} annotation(s)",
                page.width, page.height, page.scale, page.rotation, page.annotations
            ));
        }
        RenderStatus::NoPages => formatter.info(&cursor.to_string()),
        RenderStatus::Idle | RenderStatus::Cancelled => {}
        RenderStatus::Failed(err) => {
            if let Some(notice) = Notice::for_error(&err) {
                formatter.warning(&notice.message);
            }
        }
    }

    Ok(())
}

/// Write the finished document where the configuration says.
pub(crate) async fn write_output(
    config: &Config,
    formatter: &OutputFormatter,
    output: ProcessedOutput,
) -> Result<(), PdfMendError> {
    let path = config.output_path_for(&output.file_name);
    if config.is_input(&path) {
        return Err(PdfMendError::invalid_config(format!(
            "Output file cannot be the same as an input file: {}",
            path.display()
        )));
    }

    let writer = PdfWriter::new();
    writer.can_write(&path).await?;
    handle_output_overwrite(&path, config.overwrite_mode, formatter).await?;

    let notice = output.notice();
    let page_count = output.page_count;
    let process_time = output.process_time;
    let write_stats = writer.write(output.bytes, &path).await?;

    if formatter.should_print() {
        formatter.blank_line();
        formatter.notify(&notice);
        formatter.success(&format!(
            "Created {} ({})",
            path.display(),
            write_stats.format_file_size()
        ));

        if formatter.is_verbose() {
            formatter.blank_line();
            formatter.section("Statistics");
            formatter.detail("Documents", &output.source_count.to_string());
            formatter.detail("Total pages", &page_count.to_string());
            formatter.detail("Output size", &write_stats.format_file_size());
            formatter.detail(
                "Process time",
                &format!("{:.2}s", process_time.as_secs_f64()),
            );
            formatter.detail(
                "Write time",
                &format!("{:.2}s", write_stats.write_time.as_secs_f64()),
            );
        }
    }

    Ok(())
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    path: &Path,
    mode: OverwriteMode,
    formatter: &OutputFormatter,
) -> Result<(), PdfMendError> {
    // Check if output exists
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(());
    }

    match mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PdfMendError::output_exists(path.to_path_buf())),
        OverwriteMode::Prompt => {
            // In quiet mode, treat as no-clobber
            if formatter.is_quiet() {
                return Err(PdfMendError::output_exists(path.to_path_buf()));
            }

            formatter.warning(&format!("Output file already exists: {}", path.display()));
            if ask("Overwrite? [y/N]: ")? {
                Ok(())
            } else {
                Err(PdfMendError::Cancelled)
            }
        }
    }
}

/// Ask a yes/no question; anything but yes cancels.
///
/// Quiet mode cannot ask, so it cancels too.
pub(crate) fn confirm(question: &str, formatter: &OutputFormatter) -> Result<(), PdfMendError> {
    if formatter.is_quiet() {
        return Err(PdfMendError::Cancelled);
    }

    if ask(&format!("{question} [y/N]: "))? {
        Ok(())
    } else {
        Err(PdfMendError::Cancelled)
    }
}

fn ask(prompt: &str) -> Result<bool, PdfMendError> {
    print!("{prompt}");
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin()
        .read_line(&mut response)
        .map_err(|err| PdfMendError::other(format!("Failed to read input: {err}")))?;

    Ok(is_yes(&response))
}

fn is_yes(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}
