//! Output formatting

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    /// Print `rows`: as pretty JSON, or one tab-separated line per row.
    pub fn print<T: Serialize>(&self, rows: &[T], columns: impl Fn(&T) -> Vec<String>) {
        match self {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(rows).unwrap_or_default());
            }
            OutputFormat::Table => {
                for row in rows {
                    println!("{}", columns(row).join("\t"));
                }
            }
        }
    }
}
