//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use patientlist_diagnostics::{Diagnostic, Severity};
use serde::Serialize;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    JsonPretty,
    Table,
}

impl OutputFormat {
    /// Parse the `--format` flag; unknown names fall back to pretty JSON
    pub fn parse(name: Option<&str>) -> Self {
        match name.map(str::to_lowercase).as_deref() {
            Some("json") => Self::Json,
            Some("table") => Self::Table,
            _ => Self::JsonPretty,
        }
    }
}

/// Set up color output based on user preference (`auto`, `always`, `never`)
pub fn setup_colors(mode: &str) {
    let enabled = match mode.to_lowercase().as_str() {
        "always" => true,
        "never" => false,
        _ => std::io::stdout().is_terminal(),
    };
    colored::control::set_override(enabled);
}

pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {error:#}", "Error:".red().bold())
}

pub fn format_warning(warning: &str) -> String {
    format!("{} {warning}", "Warning:".yellow().bold())
}

pub fn format_success(message: &str) -> String {
    format!("{} {message}", "Success:".green().bold())
}

/// Print compile and evaluation diagnostics to stderr
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic.to_colored_string());
    }
}

/// Whether any diagnostic is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            eprintln!(
                "{}",
                format_success(&format!("Output written to {}", path.display()))
            );
        }
        None => println!("{content}"),
    }
    Ok(())
}

pub fn format_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize JSON")
}

/// Render rows as a table, or a placeholder line when there are none
pub fn format_table<R: Tabled>(rows: Vec<R>) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows).with(Style::modern()).to_string()
}

/// Key/value table for single objects
#[derive(Debug, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Print `value` in `format`, building table rows only when a table is requested
pub fn print_output<T, R, F>(
    value: &T,
    format: OutputFormat,
    output_file: Option<&Path>,
    rows: F,
) -> Result<()>
where
    T: Serialize + ?Sized,
    R: Tabled,
    F: FnOnce(&T) -> Vec<R>,
{
    let content = match format {
        OutputFormat::Json => format_json(value, false)?,
        OutputFormat::JsonPretty => format_json(value, true)?,
        OutputFormat::Table => format_table(rows(value)),
    };
    write_output(&content, output_file)
}
