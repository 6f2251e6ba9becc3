//! Interactive shell over a [`Workspace`].
//!
//! Reads one command per line from stdin. Failed commands print an error and
//! the shell keeps going; only `quit` or end of input leaves it.

use anyhow::{Context, Result, bail};
use std::io::{self, Write};

use crate::cli::ShellArgs;
use crate::commands::{EditStep, build_config};
use crate::{add_sources, load_sources, report_render, resolve_inputs, run_step, write_output};
use pdfmend::config::Config;
use pdfmend::document::MoveDirection;
use pdfmend::output::OutputFormatter;
use pdfmend::{Notice, PdfMendError, ValidationError, Workspace};

const HELP: &str = "\
Documents:
  list                  Show the pending documents
  add FILE...           Add PDF files (glob patterns allowed)
  remove N              Remove document N
  up N | down N         Move document N one place
  process               Merge or re-save the list and write the result

Editing:
  edit N                Open document N for editing
  next | prev | page N  Move between pages
  rotate-left | rotate-right | rotate DEG
  crop TOP BOTTOM LEFT RIGHT
  delete                Delete the current page
  strip-annotations | strip-metadata | compress
  save                  Keep the changes and close the editor
  cancel                Close the editor

  help | quit";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq)]
enum ShellCommand {
    Help,
    List,
    Add(Vec<String>),
    Remove(usize),
    Move(usize, MoveDirection),
    Edit(usize),
    Step(EditStep),
    Save,
    Cancel,
    Process,
    Quit,
}

impl ShellCommand {
    fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            bail!("Empty command");
        };
        let args: Vec<&str> = words.collect();

        let parsed = match (command, args.as_slice()) {
            ("help" | "?", []) => Self::Help,
            ("list" | "ls", []) => Self::List,
            ("add", []) => bail!("Usage: add FILE..."),
            ("add", files) => Self::Add(files.iter().map(|f| f.to_string()).collect()),
            ("remove" | "rm", [n]) => Self::Remove(position(n)?),
            ("up", [n]) => Self::Move(position(n)?, MoveDirection::Up),
            ("down", [n]) => Self::Move(position(n)?, MoveDirection::Down),
            ("edit", [n]) => Self::Edit(position(n)?),
            ("save", []) => Self::Save,
            ("cancel" | "close", []) => Self::Cancel,
            ("process", []) => Self::Process,
            ("quit" | "exit", []) => Self::Quit,
            ("delete", []) => Self::Step(EditStep::DeleteCurrentPage),
            (step, []) => Self::Step(EditStep::parse(step)?),
            (step, args) => Self::Step(EditStep::parse(&format!("{step}={}", args.join(",")))?),
        };

        Ok(parsed)
    }
}

/// 1-based list position to 0-based index.
fn position(text: &str) -> Result<usize> {
    let n: usize = text
        .parse()
        .with_context(|| format!("Invalid position '{text}'"))?;
    n.checked_sub(1).context("Positions start at 1")
}

enum Flow {
    Continue,
    Quit,
}

struct Shell {
    config: Config,
    formatter: OutputFormatter,
    workspace: Workspace,
}

impl Shell {
    async fn execute(&mut self, command: ShellCommand) -> Result<Flow, PdfMendError> {
        match command {
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::List => self
                .formatter
                .document_list(&self.workspace.documents().summaries()),
            ShellCommand::Add(patterns) => self.add(&patterns).await?,
            ShellCommand::Remove(index) => {
                let removed = self.workspace.remove_document(index)?;
                self.formatter.info(&format!("Removed {}", removed.name()));
            }
            ShellCommand::Move(index, direction) => {
                if self.workspace.move_document(index, direction)? {
                    self.formatter
                        .document_list(&self.workspace.documents().summaries());
                }
            }
            ShellCommand::Edit(index) => {
                self.workspace.open_for_editing(index).await?;
                if let Some(session) = self.workspace.session() {
                    self.formatter
                        .info(&format!("Editing {}", session.document_name()));
                }
                report_render(&mut self.workspace, &self.formatter).await?;
            }
            ShellCommand::Step(step) => {
                run_step(&mut self.workspace, step, &self.formatter, false).await?;
            }
            ShellCommand::Save => {
                let notice = self.workspace.commit_and_close()?;
                self.formatter.notify(&notice);
            }
            ShellCommand::Cancel => {
                if self.workspace.is_editing() {
                    self.workspace.close_editing();
                    self.formatter.info("Editor closed.");
                }
            }
            ShellCommand::Process => {
                if self.workspace.is_editing() {
                    return Err(ValidationError::SessionActive.into());
                }
                let output = self.workspace.process().await?;
                write_output(&self.config, &self.formatter, output).await?;
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    async fn add<T: AsRef<str>>(&mut self, patterns: &[T]) -> Result<(), PdfMendError> {
        let paths = resolve_inputs(patterns, &self.formatter)?;
        if paths.is_empty() {
            self.formatter.warning("No PDF files matched");
            return Ok(());
        }

        let batch = Config {
            inputs: paths,
            ..self.config.clone()
        };
        let sources = load_sources(&batch, &self.formatter).await?;
        add_sources(&mut self.workspace, sources, &self.formatter);
        self.config.inputs.extend(batch.inputs);

        self.formatter
            .document_list(&self.workspace.documents().summaries());
        Ok(())
    }

    fn prompt(&self) -> String {
        match self.workspace.session() {
            Some(session) => format!("{} [{}]> ", session.document_name(), session.cursor()),
            None => "pdfmend> ".to_string(),
        }
    }

    fn report(&self, err: &PdfMendError) {
        match err {
            PdfMendError::Cancelled => self.formatter.info("Cancelled."),
            err => {
                if let Some(notice) = Notice::for_error(err) {
                    self.formatter.notify(&notice);
                }
            }
        }
    }
}

/// Run the shell until `quit` or end of input.
pub async fn run(args: ShellArgs, verbose: bool, quiet: bool) -> Result<(), PdfMendError> {
    let formatter = OutputFormatter::new(quiet, verbose);
    let config = build_config(
        Vec::new(),
        &args.output,
        &args.load,
        args.scale,
        verbose,
        quiet,
    );
    config
        .validate_options()
        .map_err(|e| PdfMendError::invalid_config(e.to_string()))?;

    let mut shell = Shell {
        workspace: Workspace::from_config(&config),
        config,
        formatter,
    };

    if !args.inputs.is_empty() {
        shell.add(&args.inputs).await?;
    }
    shell.formatter.info("Type 'help' for commands.");

    let stdin = io::stdin();
    loop {
        print!("{}", shell.prompt());
        io::stdout().flush().ok();

        let mut line = String::new();
        let read = stdin
            .read_line(&mut line)
            .map_err(|err| PdfMendError::other(format!("Failed to read input: {err}")))?;
        if read == 0 {
            println!();
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                shell.formatter.error(&err.to_string());
                continue;
            }
        };

        match shell.execute(command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => shell.report(&err),
        }
    }

    shell.workspace.close_editing();
    Ok(())
}
