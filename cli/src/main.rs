mod definition;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use typed_args_core::{ArgsError, Diagnostic, DiagnosticCode, ParseFailure, parse_with};

use crate::definition::ArgsDefinition;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "typed-args")]
#[command(about = "Parse command-line tokens against typed argument definitions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse tokens given after `--` and print the typed values.
    Parse(ParseArgs),
    /// Check a definition file without parsing anything.
    Check(CheckArgs),
    /// Rewrite a definition file as YAML or JSON (chosen by the output extension).
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Definition file (YAML, or JSON if it ends in .json).
    #[arg(long)]
    definition: PathBuf,
    /// Ignore unknown arguments even if the definition is strict.
    #[arg(long)]
    lenient: bool,
    /// Output format for values and diagnostics.
    #[arg(long, value_enum, default_value = "json")]
    format: CliOutputFormat,
    /// Tokens to parse.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Definition file (YAML, or JSON if it ends in .json).
    #[arg(long)]
    definition: PathBuf,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Definition file to read.
    #[arg(long)]
    definition: PathBuf,
    /// File to write; `.json` selects JSON, anything else YAML.
    #[arg(long)]
    output: PathBuf,
}

/// Why a command did not succeed.
#[derive(Debug, Error)]
enum RunError {
    /// The command could not run.
    #[error("{0}")]
    Failed(String),
    /// The tokens were rejected; diagnostics were already printed.
    #[error("{} problem(s) found in the arguments", .0.diagnostics().count())]
    Rejected(ParseFailure),
}

impl RunError {
    fn exit_code(&self) -> i32 {
        match self {
            RunError::Failed(_) => 1,
            RunError::Rejected(_) => 2,
        }
    }
}

#[derive(Debug, Serialize)]
struct DiagnosticReport<'a> {
    code: DiagnosticCode,
    warning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    argument: Option<&'a str>,
    message: String,
}

impl<'a> From<&'a Diagnostic> for DiagnosticReport<'a> {
    fn from(diagnostic: &'a Diagnostic) -> Self {
        Self {
            code: diagnostic.code(),
            warning: diagnostic.is_warning(),
            argument: diagnostic.argument_name(),
            message: diagnostic.to_string(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args),
        Command::Convert(args) => run_convert(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn load_definition(path: &Path) -> Result<ArgsDefinition, RunError> {
    ArgsDefinition::load(path).map_err(|err| {
        RunError::Failed(format!(
            "Failed to load definition '{}': {err}",
            path.display()
        ))
    })
}

fn run_parse(args: ParseArgs) -> Result<(), RunError> {
    let definition = load_definition(&args.definition)?;
    let options = definition.options(args.lenient);
    debug!(tokens = ?args.tokens, lenient = options.lenient, "parsing tokens");

    match parse_with(&args.tokens, &definition.types, options) {
        Ok(parsed) => {
            print_output(&parsed, args.format)?;
            Ok(())
        }
        Err(ArgsError::Definition(err)) => Err(RunError::Failed(format!(
            "Invalid definition '{}': {err}",
            args.definition.display()
        ))),
        Err(ArgsError::Parse(failure)) => {
            {
                let reports: Vec<DiagnosticReport<'_>> =
                    failure.diagnostics().map(DiagnosticReport::from).collect();
                print_output(&reports, args.format)?;
            }
            Err(RunError::Rejected(failure))
        }
    }
}

fn run_check(args: CheckArgs) -> Result<(), RunError> {
    let definition = load_definition(&args.definition)?;
    definition.validate().map_err(|err| {
        RunError::Failed(format!("'{}': {err}", args.definition.display()))
    })?;

    let schemas: usize = definition.types.iter().map(|ty| ty.schemas().count()).sum();
    println!(
        "Definition is valid: {} type(s), {} schema(s).",
        definition.types.len(),
        schemas
    );
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<(), RunError> {
    let definition = load_definition(&args.definition)?;
    definition.validate().map_err(|err| {
        RunError::Failed(format!("'{}': {err}", args.definition.display()))
    })?;
    definition.save(&args.output).map_err(|err| {
        RunError::Failed(format!(
            "Failed to write definition '{}': {err}",
            args.output.display()
        ))
    })?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn print_output<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<(), RunError> {
    let rendered = match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| RunError::Failed(format!("Failed to serialize output: {err}")))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|err| RunError::Failed(format!("Failed to serialize output: {err}")))?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
