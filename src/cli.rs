//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing (`clap` derive)
//! - Merging command-line options with the configuration file
//! - Running the sort with progress display
//! - Printing the summary and writing the JSON report

use crate::config::{SortConfig, SortSettings};
use crate::file_organizer::{EntryOutcome, FolderSorter, SortReport};
use crate::output::OutputFormatter;
use crate::plan::{Period, PeriodKind, PlanError, SortPlan, SortStep, StepSequence};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Sort the entries of a directory into subfolders.
#[derive(Debug, Parser)]
#[command(name = "dirsort", version)]
#[command(about = "Sort a directory into folders by type, extension or creation date", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sort into content-type folders (Images, Video, Text, Audio, Fonts, Other)
    Type(CommonArgs),
    /// Sort into folders named after each file's extension
    Extension(CommonArgs),
    /// Sort into creation-date folders
    Date {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Apply several steps in order, building nested folders
    Chain {
        #[command(flatten)]
        common: CommonArgs,
        /// Steps to apply in order: d (date), e (extension), t (type), e.g. "td"
        #[arg(short, long)]
        steps: Option<StepSequence>,
        #[command(flatten)]
        period: PeriodArgs,
    },
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Directory whose entries are sorted
    pub directory: PathBuf,
    /// Show where entries would go without changing anything
    #[arg(long)]
    pub dry_run: bool,
    /// Keep going when an entry cannot be sorted
    #[arg(long)]
    pub continue_on_error: bool,
    /// Inspect file contents when the name does not reveal a type
    #[arg(long)]
    pub detect_by_content: bool,
    /// Configuration file to use instead of the default lookup
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Write a JSON report of the run to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PeriodArgs {
    /// Bucket unit: d (day), w (week) or m (month)
    #[arg(short, long)]
    pub period: Option<PeriodKind>,
    /// Number of units per bucket
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub amount: Option<u32>,
}

/// A sort request. `None` fields fall back to the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortCommand {
    ByType,
    ByExtension,
    ByDate {
        period: Option<PeriodKind>,
        amount: Option<u32>,
    },
    Chained {
        steps: Option<Vec<SortStep>>,
        period: Option<PeriodKind>,
        amount: Option<u32>,
    },
}

/// Run switches that can come from the command line.
///
/// Flags set here are combined with the `[sort]` table: a switch is on if
/// either source turns it on.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub continue_on_error: bool,
    pub detect_by_content: bool,
    pub report_path: Option<PathBuf>,
}

/// Parsed command line split into its parts.
#[derive(Debug)]
pub struct Invocation {
    pub command: SortCommand,
    pub directory: PathBuf,
    pub config_path: Option<PathBuf>,
    pub options: RunOptions,
}

impl From<Cli> for Invocation {
    fn from(cli: Cli) -> Self {
        let (command, common) = match cli.command {
            Command::Type(common) => (SortCommand::ByType, common),
            Command::Extension(common) => (SortCommand::ByExtension, common),
            Command::Date { common, period } => (
                SortCommand::ByDate {
                    period: period.period,
                    amount: period.amount,
                },
                common,
            ),
            Command::Chain {
                common,
                steps,
                period,
            } => (
                SortCommand::Chained {
                    steps: steps.map(|s| s.0),
                    period: period.period,
                    amount: period.amount,
                },
                common,
            ),
        };

        Invocation {
            command,
            directory: common.directory,
            config_path: common.config,
            options: RunOptions {
                dry_run: common.dry_run,
                continue_on_error: common.continue_on_error,
                detect_by_content: common.detect_by_content,
                report_path: common.report,
            },
        }
    }
}

/// Builds the sort plan for `command`, filling gaps from `settings`.
///
/// # Examples
///
/// ```
/// use dirsort::cli::{SortCommand, resolve_plan};
/// use dirsort::config::SortSettings;
/// use dirsort::plan::SortStep;
///
/// let plan = resolve_plan(&SortCommand::ByExtension, &SortSettings::default()).unwrap();
/// assert_eq!(plan.steps(), &[SortStep::Extension]);
/// ```
pub fn resolve_plan(command: &SortCommand, settings: &SortSettings) -> Result<SortPlan, PlanError> {
    let period = |kind: &Option<PeriodKind>, amount: &Option<u32>| {
        Period::new(
            kind.unwrap_or(settings.period),
            amount.unwrap_or(settings.amount),
        )
    };

    match command {
        SortCommand::ByType => Ok(SortPlan::single(SortStep::Type, settings.period()?)),
        SortCommand::ByExtension => Ok(SortPlan::single(SortStep::Extension, settings.period()?)),
        SortCommand::ByDate {
            period: kind,
            amount,
        } => Ok(SortPlan::single(SortStep::Date, period(kind, amount)?)),
        SortCommand::Chained {
            steps,
            period: kind,
            amount,
        } => {
            let steps = steps.clone().unwrap_or_else(|| settings.steps.clone());
            SortPlan::new(steps, period(kind, amount)?)
        }
    }
}

/// Runs an already parsed command line.
pub fn run(cli: Cli) -> Result<(), String> {
    let invocation = Invocation::from(cli);
    run_cli_with_config(
        invocation.command,
        &invocation.directory,
        invocation.config_path.as_deref(),
        &invocation.options,
    )
}

/// Runs `command` on `dir_path` with default options and configuration lookup.
///
/// # Examples
///
/// ```no_run
/// use dirsort::cli::{run_cli, SortCommand};
/// use std::path::Path;
///
/// match run_cli(SortCommand::ByType, Path::new("/path/to/directory")) {
///     Ok(()) => println!("Sorted"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(command: SortCommand, dir_path: &Path) -> Result<(), String> {
    run_cli_with_config(command, dir_path, None, &RunOptions::default())
}

/// Runs `command` on `dir_path` with an optional configuration file.
///
/// This function:
/// 1. Loads the configuration and compiles the filters
/// 2. Resolves and validates the sort plan before touching the filesystem
/// 3. Lists the directory once
/// 4. Sorts every entry, showing progress
/// 5. Prints a summary and writes the report if one was requested
///
/// An error is returned when the run aborts, and also when it finishes with
/// failed entries under continue-on-error.
pub fn run_cli_with_config(
    command: SortCommand,
    dir_path: &Path,
    config_path: Option<&Path>,
    options: &RunOptions,
) -> Result<(), String> {
    let config =
        SortConfig::load(config_path).map_err(|e| format!("Error loading configuration: {}", e))?;
    let filters = config
        .compile_filters()
        .map_err(|e| format!("Error compiling filters: {}", e))?;
    let plan = resolve_plan(&command, &config.sort).map_err(|e| format!("Error: {}", e))?;

    let sorter = FolderSorter::new(dir_path)
        .with_filters(filters)
        .dry_run(options.dry_run)
        .continue_on_error(options.continue_on_error || config.sort.continue_on_error)
        .detect_by_content(options.detect_by_content || config.sort.detect_by_content);

    let steps: Vec<String> = plan.steps().iter().map(|s| s.to_string()).collect();
    if options.dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Analyzing contents of: {}",
            dir_path.display()
        ));
    } else {
        OutputFormatter::info(&format!("Sorting contents of: {}", dir_path.display()));
    }
    if plan.uses_date() {
        OutputFormatter::plain(&format!(
            "Steps: {} ({} x {})",
            steps.join(" → "),
            plan.period().amount(),
            plan.period().kind()
        ));
    } else {
        OutputFormatter::plain(&format!("Steps: {}", steps.join(" → ")));
    }

    let entries = sorter.collect_entries().map_err(|e| format!("Error: {}", e))?;
    if entries.is_empty() {
        OutputFormatter::plain("Nothing to sort.");
        return Ok(());
    }

    let pb = OutputFormatter::create_progress_bar(entries.len() as u64);
    let result = sorter.sort_entries(&entries, &plan, |outcome| {
        match outcome {
            EntryOutcome::Moved(op) => {
                let name = op
                    .original_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                pb.set_message(name);
            }
            EntryOutcome::Failed { error, .. } => {
                pb.println(format!("✗ {}", error));
            }
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    let report = result.map_err(|e| format!("Sort aborted: {}", e))?;
    print_report(&report);

    if let Some(report_path) = &options.report_path {
        report
            .save(report_path)
            .map_err(|e| format!("Error: {}", e))?;
        OutputFormatter::plain(&format!("Report written to {}", report_path.display()));
    }

    if !report.is_complete_success() {
        return Err(format!(
            "{} of {} entries could not be sorted",
            report.failed.len(),
            entries.len()
        ));
    }
    Ok(())
}

fn print_report(report: &SortReport) {
    if report.dry_run {
        OutputFormatter::header("Entries would be sorted as follows:");
        for op in &report.moved {
            let name = op
                .original_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            OutputFormatter::plain(&format!(" - {} → {}/", name, op.destination_label()));
        }
    }

    OutputFormatter::summary_table(&report.destination_counts(), report.moved.len());

    if !report.failed.is_empty() {
        OutputFormatter::header("FAILED");
        for failure in &report.failed {
            OutputFormatter::error(&format!("{}: {}", failure.path.display(), failure.reason));
        }
    }

    if report.dry_run {
        OutputFormatter::success(&format!(
            "Dry run complete. {} new folders would be created, nothing was modified.",
            report.created_dirs.len()
        ));
    } else {
        OutputFormatter::success(&format!(
            "Sorted {} entries, created {} folders.",
            report.moved.len(),
            report.created_dirs.len()
        ));
    }
}
