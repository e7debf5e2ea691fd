//! `sanitize` command: runs JSON documents through the schema's rules.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use sanitas_core::{JsonSanitizer, SchemaConfig};

use crate::cli::SanitizeCommand;
use crate::constraints::stock_registry;

/// The main operation runner for `sanitas sanitize`.
pub fn run_sanitize(cmd: &SanitizeCommand) -> Result<()> {
    info!("Starting sanitize operation for class '{}'.", cmd.class);

    let schema = SchemaConfig::load_from_file(&cmd.schema)?;
    let sanitizer = JsonSanitizer::new(schema, stock_registry()).context("Failed to register schema")?;

    let input = read_input(cmd.input_file.as_deref())?;
    let rendered = sanitize_document(&sanitizer, &cmd.class, &input, cmd.pretty)?;
    debug!("Input length: {}, output length: {}", input.len(), rendered.len());

    write_output(cmd.output.as_deref(), &rendered)?;
    info!("Sanitize operation completed.");
    Ok(())
}

/// Parses `input`, sanitizes it as `class`, and renders the result.
pub fn sanitize_document(sanitizer: &JsonSanitizer, class: &str, input: &str, pretty: bool) -> Result<String> {
    let document: serde_json::Value = serde_json::from_str(input).context("Input is not valid JSON")?;
    let sanitized = sanitizer
        .sanitize_json(class, document)
        .with_context(|| format!("Failed to sanitize input as '{}'", class))?;
    let rendered = if pretty {
        serde_json::to_string_pretty(&sanitized)?
    } else {
        serde_json::to_string(&sanitized)?
    };
    Ok(rendered)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            debug!("Reading input from file: {}", path.display());
            fs::read_to_string(path).with_context(|| format!("Failed to read input file: {}", path.display()))
        }
        None => {
            debug!("Reading input from stdin.");
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => {
            info!("Writing sanitized content to file: {}", path.display());
            let mut file = fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            writeln!(file, "{}", rendered)?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writeln!(writer, "{}", rendered)?;
        }
    }
    Ok(())
}
