// sanitas/src/cli.rs
//! This file defines the command-line interface (CLI) for the sanitas application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "sanitas",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Sanitize JSON documents against a schema of per-field rules",
    long_about = "Sanitas applies declarative, per-field sanitization rules (trimming, case folding, type coercion, email normalization, nested objects and custom constraints) to JSON documents. Classes, their parents and their field rules are declared in a YAML schema.",
    arg_required_else_help = true,
)]
pub struct Cli {
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Sanitizes a JSON document (or an array of documents) as instances of a schema class.")]
    Sanitize(SanitizeCommand),

    #[command(about = "Prints the rules that apply to a schema class, inherited rules included.")]
    Rules(RulesCommand),
}

/// Arguments for the `sanitize` command.
#[derive(Parser, Debug)]
pub struct SanitizeCommand {
    #[arg(long, short = 's', value_name = "FILE", env = "SANITAS_SCHEMA", help = "Path to the YAML schema.")]
    pub schema: PathBuf,

    #[arg(long, short = 'c', value_name = "NAME", help = "Schema class the input documents are instances of.")]
    pub class: String,

    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Write sanitized output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Pretty-print the sanitized JSON.")]
    pub pretty: bool,
}

/// Arguments for the `rules` command.
#[derive(Parser, Debug)]
pub struct RulesCommand {
    #[arg(long, short = 's', value_name = "FILE", env = "SANITAS_SCHEMA", help = "Path to the YAML schema.")]
    pub schema: PathBuf,

    #[arg(long, short = 'c', value_name = "NAME", help = "Schema class to resolve rules for.")]
    pub class: String,
}
