//! Output formatting for load summaries

mod json;
mod terminal;

use std::io::Write;

use anyhow::Result;

use crate::config::OutputFormat;
use crate::error::{ReadError, ReadResult};
use crate::model::Table;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Outcome of loading one file
#[derive(Debug)]
pub enum Outcome<'a> {
    Loaded(&'a Table),
    Failed(&'a ReadError),
}

/// One line item of a report
#[derive(Debug)]
pub struct ReportEntry<'a> {
    /// File path or event part the entry describes
    pub label: String,
    pub outcome: Outcome<'a>,
}

/// Everything a formatter renders
#[derive(Debug, Default)]
pub struct LoadReport<'a> {
    pub entries: Vec<ReportEntry<'a>>,
}

impl<'a> LoadReport<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_table(&mut self, label: impl Into<String>, table: &'a Table) {
        self.entries.push(ReportEntry {
            label: label.into(),
            outcome: Outcome::Loaded(table),
        });
    }

    pub fn push_error(&mut self, label: impl Into<String>, error: &'a ReadError) {
        self.entries.push(ReportEntry {
            label: label.into(),
            outcome: Outcome::Failed(error),
        });
    }

    pub fn push_result(&mut self, label: impl Into<String>, result: &'a ReadResult<Table>) {
        match result {
            Ok(table) => self.push_table(label, table),
            Err(error) => self.push_error(label, error),
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Loaded(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.loaded_count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a load report to a writer
    fn render(&self, report: &LoadReport<'_>, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter showing up to `preview_rows` rows per table
    pub fn create(format: OutputFormat, preview_rows: usize) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new(preview_rows)),
            OutputFormat::Json => Box::new(JsonOutput::new(preview_rows)),
        }
    }
}

/// Render a load report to stdout
pub fn render_to_stdout(report: &LoadReport<'_>, format: OutputFormat, preview_rows: usize) -> Result<()> {
    let formatter = OutputFactory::create(format, preview_rows);
    let mut stdout = std::io::stdout();
    formatter.render(report, &mut stdout)
}
