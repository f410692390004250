//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use startup_core::result::AppResult;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Marker printed in front of status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Fail,
}

impl Status {
    fn marker(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::Warn => "⚠",
            Self::Fail => "✗",
        }
    }
}

/// Prints rows as a table, or as a JSON array.
pub fn print_rows<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table if rows.is_empty() => {
            println!("(none)");
            Ok(())
        }
        OutputFormat::Table => {
            println!("{}", Table::new(rows));
            Ok(())
        }
    }
}

/// Prints any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a status line. Failures go to stderr.
pub fn status(status: Status, msg: &str) {
    match status {
        Status::Fail => eprintln!("{} {msg}", status.marker()),
        _ => println!("{} {msg}", status.marker()),
    }
}

/// Prints an indented `key: value` line.
pub fn print_kv(key: &str, value: impl std::fmt::Display) {
    println!("  {:<12} {value}", format!("{key}:"));
}
