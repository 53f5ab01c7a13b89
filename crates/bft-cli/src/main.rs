mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bft_core::{
    Error as CoreError, Manifest, ManifestFormat, load_manifest, manifest_json_schema,
    serialize_manifest, write_manifest,
};
use bft_estimate::{
    estimate_table_rows, render_strategies, render_table_estimate, table_strategies,
};
use bft_validate::{ValidationReport, validate_manifest};
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

#[derive(Parser, Debug)]
#[command(name = "bft", version, about = "Validate BFT manifests and estimate table sizes")]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report every validation error in a manifest.
    Validate(ValidateArgs),
    /// Estimate row counts for report tables.
    Estimate(EstimateArgs),
    /// Show the strategy governing each metric on each table entity.
    Strategies(StrategiesArgs),
    /// Re-serialize a manifest canonically.
    Fmt(FmtArgs),
    /// Print the manifest JSON Schema.
    Schema,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Manifest path (.toml or .json).
    manifest: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct EstimateArgs {
    manifest: PathBuf,
    /// Only estimate this table.
    #[arg(long)]
    table: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct StrategiesArgs {
    manifest: PathBuf,
    #[arg(long)]
    table: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct FmtArgs {
    manifest: PathBuf,
    /// Write here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Target format; defaults to the output path's format, else the input's.
    #[arg(long, value_enum)]
    to: Option<DocumentFormat>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DocumentFormat {
    Toml,
    Json,
}

impl From<DocumentFormat> for ManifestFormat {
    fn from(value: DocumentFormat) -> Self {
        match value {
            DocumentFormat::Toml => ManifestFormat::Toml,
            DocumentFormat::Json => ManifestFormat::Json,
        }
    }
}

fn main() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_json)?;

    match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Estimate(args) => run_estimate(args),
        Command::Strategies(args) => run_strategies(args),
        Command::Fmt(args) => run_fmt(args),
        Command::Schema => run_schema(),
    }
}

fn run_validate(args: ValidateArgs) -> Result<ExitCode, CliError> {
    let manifest = load_manifest(&args.manifest)?;
    let report = validate_manifest(&manifest);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text if report.is_ok() => println!("manifest is valid"),
        OutputFormat::Text => print_report(&report),
    }

    Ok(exit_for(&report))
}

fn run_estimate(args: EstimateArgs) -> Result<ExitCode, CliError> {
    let Some(manifest) = load_valid(&args.manifest)? else {
        return Ok(ExitCode::FAILURE);
    };

    let tables = match &args.table {
        Some(name) => vec![find_table(&manifest, name)?],
        None => manifest.tables.iter().collect(),
    };

    let estimates: Vec<_> = tables
        .into_iter()
        .map(|table| estimate_table_rows(&manifest, table))
        .collect();
    tracing::info!(event = "tables_estimated", count = estimates.len());

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&estimates)?),
        OutputFormat::Text => {
            let rendered: Vec<String> = estimates.iter().map(render_table_estimate).collect();
            println!("{}", rendered.join("\n\n"));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_strategies(args: StrategiesArgs) -> Result<ExitCode, CliError> {
    let Some(manifest) = load_valid(&args.manifest)? else {
        return Ok(ExitCode::FAILURE);
    };

    let table = find_table(&manifest, &args.table)?;
    let strategies = table_strategies(&manifest, table);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&strategies)?),
        OutputFormat::Text => println!("{}", render_strategies(&table.name, &strategies)),
    }

    Ok(ExitCode::SUCCESS)
}

fn run_fmt(args: FmtArgs) -> Result<ExitCode, CliError> {
    let manifest = load_manifest(&args.manifest)?;

    let format = match (args.to, &args.out) {
        (Some(format), _) => format.into(),
        (None, Some(out)) => ManifestFormat::from_path(out)?,
        (None, None) => ManifestFormat::from_path(&args.manifest)?,
    };

    match &args.out {
        Some(out) => {
            write_manifest(out, &manifest, format)?;
            tracing::info!(event = "manifest_formatted", path = %out.display());
        }
        None => print!("{}", serialize_manifest(&manifest, format)?),
    }

    Ok(ExitCode::SUCCESS)
}

fn run_schema() -> Result<ExitCode, CliError> {
    let schema = manifest_json_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(ExitCode::SUCCESS)
}

/// Load a manifest and validate it; errors are printed and `None` returned.
fn load_valid(path: &Path) -> Result<Option<Manifest>, CliError> {
    let manifest = load_manifest(path)?;
    let report = validate_manifest(&manifest);
    if report.is_ok() {
        return Ok(Some(manifest));
    }

    tracing::warn!(event = "validation_failed", errors = report.errors.len());
    eprintln!("manifest validation failed; nothing estimated");
    print_report(&report);
    Ok(None)
}

fn find_table<'a>(manifest: &'a Manifest, name: &str) -> Result<&'a bft_core::BftTable, CliError> {
    manifest
        .table(name)
        .ok_or_else(|| CliError::InvalidArgs(format!("unknown table '{name}'")))
}

fn print_report(report: &ValidationReport) {
    for error in &report.errors {
        let path = error.path.as_deref().unwrap_or("/");
        eprintln!("error {} {}: {}", error.rule, path, error.message);
        if let Some(hint) = &error.hint {
            eprintln!("  hint: {hint}");
        }
    }
}

fn exit_for(report: &ValidationReport) -> ExitCode {
    if report.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
