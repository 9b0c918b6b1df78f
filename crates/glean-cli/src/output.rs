//! Output formatting for the CLI.

use crate::config::DisplayFormat;
use crate::error::Result;
use colored::*;
use glean_domain::{ExtractionOutcome, Filter};
use serde_json::Value;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: DisplayFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: DisplayFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome for display; `None` means nothing to print.
    pub fn format_outcome(
        &self,
        outcome: &ExtractionOutcome,
        filter: &Filter,
    ) -> Result<Option<String>> {
        match self.format {
            DisplayFormat::None => Ok(None),
            DisplayFormat::Json => self.format_json(outcome).map(Some),
            DisplayFormat::Table => self.format_table(outcome, filter).map(Some),
        }
    }

    /// Format records as pretty-printed JSON.
    fn format_json(&self, outcome: &ExtractionOutcome) -> Result<String> {
        Ok(serde_json::to_string_pretty(&outcome.records)?)
    }

    /// Format records as a table: Input column plus one column per field.
    fn format_table(&self, outcome: &ExtractionOutcome, filter: &Filter) -> Result<String> {
        if outcome.records.is_empty() {
            return Ok(self.colorize("No records found.", "yellow"));
        }

        let mut builder = Builder::default();

        let mut header = vec!["Input".to_string()];
        header.extend(filter.field_names().iter().map(|n| n.to_string()));
        builder.push_record(header);

        for record in &outcome.records {
            let mut row = vec![truncate(&record.input, 40)];
            for name in filter.field_names() {
                row.push(render_cell(record.get(name)));
            }
            builder.push_record(row);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        Ok(table.to_string())
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// One-line run summary.
    pub fn summary(&self, outcome: &ExtractionOutcome) -> String {
        let mut msg = format!(
            "Extracted {} record(s) from {} input(s) in {}ms",
            outcome.records.len(),
            outcome.metadata.inputs_processed,
            outcome.metadata.processing_time_ms
        );
        if !outcome.failures.is_empty() {
            msg.push_str(&format!(", {} rejected", outcome.failures.len()));
        }
        self.info(&msg)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render a field value for a table or CSV cell.
///
/// Strings are unquoted, nulls become empty cells, lists are rendered as
/// JSON so they survive a CSV round trip.
pub fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}…", head)
    }
}
