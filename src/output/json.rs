//! JSON output format

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::model::{Schema, Value};

use super::{LoadReport, Outcome, OutputFormatter};

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
    preview_rows: usize,
}

impl JsonOutput {
    pub fn new(preview_rows: usize) -> Self {
        Self {
            pretty: true,
            preview_rows,
        }
    }

    pub fn compact(preview_rows: usize) -> Self {
        Self {
            pretty: false,
            preview_rows,
        }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new(5)
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum JsonEntry<'a> {
    Ok {
        label: &'a str,
        rows: usize,
        columns: usize,
        key_column: Option<&'a str>,
        schema: &'a Schema,
        preview: Vec<&'a [Value]>,
    },
    Error {
        label: &'a str,
        kind: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<u64>,
        message: String,
    },
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: Vec<JsonEntry<'a>>,
    loaded: usize,
    failed: usize,
}

impl OutputFormatter for JsonOutput {
    fn render(&self, report: &LoadReport<'_>, writer: &mut dyn Write) -> Result<()> {
        let files = report
            .entries
            .iter()
            .map(|entry| match entry.outcome {
                Outcome::Loaded(table) => JsonEntry::Ok {
                    label: &entry.label,
                    rows: table.row_count(),
                    columns: table.column_count(),
                    key_column: table.key_column(),
                    schema: table.schema(),
                    preview: table
                        .records()
                        .iter()
                        .take(self.preview_rows)
                        .map(|r| r.values.as_slice())
                        .collect(),
                },
                Outcome::Failed(error) => JsonEntry::Error {
                    label: &entry.label,
                    kind: error.kind(),
                    line: error.line(),
                    message: error.to_string(),
                },
            })
            .collect();

        let output = JsonReport {
            files,
            loaded: report.loaded_count(),
            failed: report.failed_count(),
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::error::ReadError;
    use crate::model::{ColumnType, Record, Table};

    #[test]
    fn test_render_json() {
        let schema: Schema = "hit_id:int,x:float".parse().unwrap();
        let mut table = Table::new(schema, Some(0));
        table
            .push_record(Record::new(vec![Value::Int(1), Value::Float(0.25)], 2), true)
            .unwrap();
        let error = ReadError::Parse {
            path: PathBuf::from("bad.csv"),
            line: 3,
            column: "x".into(),
            raw: "abc".into(),
            expected: ColumnType::Float,
        };

        let mut report = LoadReport::new();
        report.push_table("hits.csv", &table);
        report.push_error("bad.csv", &error);

        let mut out = Vec::new();
        JsonOutput::compact(5).render(&report, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["loaded"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["files"][0]["status"], "ok");
        assert_eq!(value["files"][0]["schema"]["x"], "float");
        assert_eq!(value["files"][0]["preview"][0][1], 0.25);
        assert_eq!(value["files"][1]["kind"], "parse");
        assert_eq!(value["files"][1]["line"], 3);
    }
}
