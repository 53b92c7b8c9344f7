//! imgsplit: split a labeled image folder into training, test and validation sets.
//!
//! The input is a directory with one subdirectory per class. Each class is
//! shuffled and split on its own, so every output set keeps the class
//! balance of the input. Class directories can be merged into a shared
//! output label and images can be made square on the way out.
//!
//! # Modules
//!
//! - [`dataset`]: class directory naming and source discovery
//! - [`split`]: split planning, per-label file numbering and reports
//! - [`square`]: pad-to-square and crop-to-square transforms
//! - [`layout`]: preparing the destination folders
//! - [`execute`]: writing a plan to disk
//! - [`error`]: Error types for imgsplit operations

pub mod dataset;
pub mod error;
pub mod execute;
pub mod layout;
pub mod logging;
pub mod split;
pub mod square;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

pub use error::ImgsplitError;

use dataset::InventoryReport;
use execute::ExecuteOptions;
use split::{SplitMode, SplitOptions, SplitReport};

/// The imgsplit CLI application.
#[derive(Parser)]
#[command(name = "imgsplit")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Split a class-per-folder image dataset into output sets.
    Split(SplitArgs),
    /// List the classes found in a dataset without writing anything.
    Inspect(InspectArgs),
}

/// Arguments for the split subcommand.
#[derive(clap::Args)]
struct SplitArgs {
    /// Directory whose subdirectories are the source classes.
    input: PathBuf,

    /// Fraction of each class sent to the test set (0.0 to 1.0).
    #[arg(long)]
    test: f64,

    /// Fraction of each class sent to the validation set; enables a three-way split.
    #[arg(long)]
    validation: Option<f64>,

    /// Rename files to {label}.{index}.{extension}.
    #[arg(long)]
    rename: bool,

    /// Make images square (black padding, or cropping for --Crop classes).
    #[arg(long)]
    square: bool,

    /// Seed for reproducible shuffles.
    #[arg(long, env = "IMGSPLIT_SEED")]
    seed: Option<u64>,

    /// Directory that receives training_set/, test_set/ and validation_set/.
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,

    /// Plan the split and print the report without writing files.
    #[arg(long)]
    dry_run: bool,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Directory whose subdirectories are the source classes.
    input: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,
}

/// Report rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    fn parse(value: &str) -> Result<Self, ImgsplitError> {
        match value {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(ImgsplitError::UnsupportedReportFormat(format!(
                "'{}' (supported: text, json)",
                other
            ))),
        }
    }

    fn print<R: Serialize + std::fmt::Display>(self, report: &R) -> Result<(), ImgsplitError> {
        match self {
            ReportFormat::Text => print!("{}", report),
            ReportFormat::Json => {
                let json = serde_json::to_string_pretty(report)
                    .map_err(|source| ImgsplitError::ReportWrite { source })?;
                println!("{}", json);
            }
        }
        Ok(())
    }
}

/// Run the imgsplit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ImgsplitError> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Split(args)) => run_split(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        None => {
            println!("imgsplit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Split labeled image folders into training, test and validation sets.");
            println!();
            println!("Run 'imgsplit --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the split subcommand.
fn run_split(args: SplitArgs) -> Result<(), ImgsplitError> {
    let format = ReportFormat::parse(&args.report)?;

    let opts = SplitOptions {
        mode: if args.validation.is_some() {
            SplitMode::TestAndValidation
        } else {
            SplitMode::TestOnly
        },
        test_fraction: args.test,
        validation_fraction: args.validation.unwrap_or(0.0),
        rename: args.rename,
        seed: args.seed,
    };
    split::validate_split_options(&opts)?;

    let classes = dataset::discover_source_classes(&args.input)?;
    let plan = split::plan_split(&classes, &opts)?;

    let report: SplitReport = if args.dry_run {
        execute::dry_run_report(&plan, opts.seed)
    } else {
        let exec = ExecuteOptions {
            square: args.square,
            seed: opts.seed,
        };
        execute::execute_plan(&plan, &args.output, &exec)?
    };

    format.print(&report)?;

    if report.is_clean() {
        Ok(())
    } else {
        Err(ImgsplitError::FilesFailed {
            failed: report.failure_count(),
        })
    }
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), ImgsplitError> {
    let format = ReportFormat::parse(&args.report)?;
    let classes = dataset::discover_source_classes(&args.input)?;
    format.print(&InventoryReport::from_classes(&classes))
}
