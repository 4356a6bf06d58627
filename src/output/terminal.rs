//! Colored terminal output

use std::io::{IsTerminal, Write};

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

use crate::error::ReadError;
use crate::model::Table;

use super::{LoadReport, Outcome, OutputFormatter};

/// Terminal output with colors
pub struct TerminalOutput {
    color_choice: ColorChoice,
    preview_rows: usize,
}

impl TerminalOutput {
    pub fn new(preview_rows: usize) -> Self {
        Self {
            color_choice: ColorChoice::Auto,
            preview_rows,
        }
    }

    pub fn with_color_choice(mut self, color_choice: ColorChoice) -> Self {
        self.color_choice = color_choice;
        self
    }

    fn buffer(&self) -> Buffer {
        match self.color_choice {
            ColorChoice::Never => Buffer::no_color(),
            ColorChoice::Auto if !std::io::stdout().is_terminal() => Buffer::no_color(),
            choice => BufferWriter::stdout(choice).buffer(),
        }
    }

    fn write_header(&self, buf: &mut Buffer, label: &str) -> Result<()> {
        buf.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(buf, "━━ {}", label)?;
        buf.reset()?;
        Ok(())
    }

    fn write_table(&self, buf: &mut Buffer, table: &Table) -> Result<()> {
        writeln!(
            buf,
            "{} rows × {} columns, key: {}",
            table.row_count(),
            table.column_count(),
            table.key_column().unwrap_or("-")
        )?;
        writeln!(buf, "schema: {}", table.schema())?;

        if self.preview_rows > 0 && !table.is_empty() {
            writeln!(buf, "{}", preview(table, self.preview_rows))?;
            if table.row_count() > self.preview_rows {
                writeln!(buf, "… {} more rows", table.row_count() - self.preview_rows)?;
            }
        }
        writeln!(buf)?;
        Ok(())
    }

    fn write_error(&self, buf: &mut Buffer, error: &ReadError) -> Result<()> {
        buf.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        write!(buf, "error")?;
        buf.reset()?;
        writeln!(buf, " [{}]: {}", error.kind(), error)?;
        writeln!(buf)?;
        Ok(())
    }

    fn write_summary(&self, buf: &mut Buffer, report: &LoadReport<'_>) -> Result<()> {
        let color = if report.has_failures() {
            Color::Yellow
        } else {
            Color::Green
        };
        buf.set_color(ColorSpec::new().set_fg(Some(color)))?;
        writeln!(
            buf,
            "Loaded {} of {} files",
            report.loaded_count(),
            report.entries.len()
        )?;
        buf.reset()?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new(5)
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, report: &LoadReport<'_>, writer: &mut dyn Write) -> Result<()> {
        let mut buf = self.buffer();

        for entry in &report.entries {
            self.write_header(&mut buf, &entry.label)?;
            match entry.outcome {
                Outcome::Loaded(table) => self.write_table(&mut buf, table)?,
                Outcome::Failed(error) => self.write_error(&mut buf, error)?,
            }
        }
        self.write_summary(&mut buf, report)?;

        writer.write_all(buf.as_slice())?;
        Ok(())
    }
}

/// First `rows` records of a table, boxed
fn preview(table: &Table, rows: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.schema().names().map(str::to_string));
    for record in table.records().iter().take(rows) {
        builder.push_record(record.values.iter().map(|v| v.display().into_owned()));
    }

    let mut rendered = builder.build();
    rendered.with(Style::modern());
    rendered.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::model::{Record, Schema, Value};

    fn table() -> Table {
        let schema: Schema = "hit_id:int,x:float".parse().unwrap();
        let mut table = Table::new(schema, Some(0));
        for i in 1..=3 {
            table
                .push_record(
                    Record::new(vec![Value::Int(i), Value::Float(i as f64 * 0.5)], i as u64 + 1),
                    true,
                )
                .unwrap();
        }
        table
    }

    #[test]
    fn test_render_table_and_error() {
        let table = table();
        let error = ReadError::NotFound {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let mut report = LoadReport::new();
        report.push_table("hits.csv", &table);
        report.push_error("missing.csv", &error);

        let output = TerminalOutput::new(2).with_color_choice(ColorChoice::Never);
        let mut out = Vec::new();
        output.render(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("━━ hits.csv"));
        assert!(text.contains("3 rows × 2 columns, key: hit_id"));
        assert!(text.contains("schema: hit_id:int,x:float"));
        assert!(text.contains("0.5"));
        assert!(text.contains("… 1 more rows"));
        assert!(text.contains("error [not_found]: missing.csv"));
        assert!(text.contains("Loaded 1 of 2 files"));
    }
}
