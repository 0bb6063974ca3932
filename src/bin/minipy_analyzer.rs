//! Command-line interface for the MiniPy analyzer
//!
//! Analyzes a snippet from a file or stdin and prints the report.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use minipy_analyzer::diagnostics::{Format, ReportFormatter};
use minipy_analyzer::{AnalysisEngine, EngineConfig, parse, tokenize};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "minipy-analyzer")]
#[command(about = "Lexical, syntactic and semantic analysis of MiniPy snippets")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Compact,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Format::Text,
            OutputFormat::Compact => Format::Compact,
            OutputFormat::Json => Format::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run all three stages and print the report
    Analyze {
        /// Source file (reads from stdin if not provided)
        file: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Only list failing checks
        #[arg(long)]
        failures_only: bool,
        /// Omit the symbol table from text output
        #[arg(long)]
        no_symbols: bool,
    },
    /// Print the tokens and per-kind counts
    Tokens {
        /// Source file (reads from stdin if not provided)
        file: Option<PathBuf>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Print the syntax report with the AST
    Ast {
        /// Source file (reads from stdin if not provided)
        file: Option<PathBuf>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Handle a JSON request of the form {"code": "..."}
    Request {
        /// Request file (reads from stdin if not provided)
        file: Option<PathBuf>,
    },
    /// Print analyzer information
    Info {
        /// Print the liveness status instead
        #[arg(long)]
        health: bool,
    },
}

fn main() {
    // Setup human-panic for better error messages
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn run(cli: Cli) -> Result<i32> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = AnalysisEngine::with_config(config);

    match cli.command {
        Commands::Analyze {
            file,
            format,
            failures_only,
            no_symbols,
        } => {
            let source = read_input(file.as_deref())?;
            let report = engine.analyze_checked(&source)?;
            let formatter = ReportFormatter::new(format.into())
                .with_checks(!failures_only)
                .with_symbols(!no_symbols);
            println!("{}", formatter.format(&report));
            Ok(if report.success { 0 } else { 1 })
        }
        Commands::Tokens { file, pretty } => {
            let source = read_input(file.as_deref())?;
            let lexical = tokenize(&source);
            println!("{}", to_json(&lexical, pretty)?);
            Ok(0)
        }
        Commands::Ast { file, pretty } => {
            let source = read_input(file.as_deref())?;
            let syntax = parse(&tokenize(&source).tokens);
            println!("{}", to_json(&syntax, pretty)?);
            Ok(if syntax.valid { 0 } else { 1 })
        }
        Commands::Request { file } => {
            let body = read_input(file.as_deref())?;
            match engine.handle_request(&body) {
                Ok(report) => {
                    println!("{}", to_json(&report, true)?);
                    Ok(0)
                }
                Err(e) => {
                    println!("{}", to_json(&e.rejection(), true)?);
                    Ok(1)
                }
            }
        }
        Commands::Info { health } => {
            let output = if health {
                to_json(&engine.health(), true)?
            } else {
                to_json(&engine.info(), true)?
            };
            println!("{output}");
            Ok(0)
        }
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Error reading file '{}'", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Error reading from stdin")?;
            Ok(buffer)
        }
    }
}

fn to_json(value: &impl Serialize, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
