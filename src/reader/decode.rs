//! Record decoding against a schema

use std::path::Path;

use csv::StringRecord;

use crate::config::ReaderConfig;
use crate::error::{ReadError, ReadResult};
use crate::model::{ColumnType, Record, Schema, Table, Value};

/// A raw CSV record with the line it starts on
pub(crate) type RawRecord = (StringRecord, u64);

/// How file fields map onto schema columns
#[derive(Debug)]
pub(crate) struct Layout {
    /// Field index in the file for each schema column
    mapping: Vec<usize>,
    /// Number of fields every row must have
    width: usize,
}

impl Layout {
    /// Fields map one-to-one onto columns in order
    pub(crate) fn identity(width: usize) -> Self {
        Self {
            mapping: (0..width).collect(),
            width,
        }
    }

    /// Match a caller-supplied schema against the file header.
    ///
    /// With a header, columns are matched by name so the file may list them
    /// in any order. Without one, fields are taken positionally.
    pub(crate) fn declared(
        path: &Path,
        schema: &Schema,
        header: Option<&StringRecord>,
    ) -> ReadResult<Self> {
        let Some(header) = header else {
            return Ok(Self::identity(schema.len()));
        };

        if header.len() != schema.len() {
            return Err(ReadError::SchemaMismatch {
                path: path.to_path_buf(),
                line: Some(1),
                message: format!(
                    "schema declares {} columns, header has {}",
                    schema.len(),
                    header.len()
                ),
            });
        }

        let mapping = schema
            .names()
            .map(|name| {
                header
                    .iter()
                    .position(|h| h == name)
                    .ok_or_else(|| ReadError::SchemaMismatch {
                        path: path.to_path_buf(),
                        line: Some(1),
                        message: format!("column '{}' not found in header", name),
                    })
            })
            .collect::<ReadResult<Vec<_>>>()?;

        Ok(Self {
            mapping,
            width: header.len(),
        })
    }
}

/// Column names from a header line; names must be unique
pub(crate) fn header_names(path: &Path, header: &StringRecord) -> ReadResult<Vec<String>> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for name in header.iter() {
        if names.iter().any(|n| n == name) {
            return Err(ReadError::SchemaMismatch {
                path: path.to_path_buf(),
                line: Some(1),
                message: format!("duplicate column '{}' in header", name),
            });
        }
        names.push(name.to_string());
    }
    Ok(names)
}

/// Names for a file without a header
pub(crate) fn generated_names(width: usize) -> Vec<String> {
    (0..width).map(|i| format!("column_{}", i)).collect()
}

/// Decode every record into a table.
///
/// Stops at the first error; no partially filled table is returned.
pub(crate) fn fill_table<I>(
    path: &Path,
    config: &ReaderConfig,
    schema: Schema,
    layout: &Layout,
    records: I,
) -> ReadResult<Table>
where
    I: Iterator<Item = ReadResult<RawRecord>>,
{
    let key_column = resolve_key_column(path, config, &schema)?;
    let columns: Vec<(String, ColumnType)> = schema
        .columns()
        .map(|c| (c.name, c.column_type))
        .collect();

    let mut table = Table::new(schema, key_column);

    for item in records {
        let (record, line) = item?;

        if record.len() != layout.width {
            return Err(ReadError::SchemaMismatch {
                path: path.to_path_buf(),
                line: Some(line),
                message: format!("expected {} fields, found {}", layout.width, record.len()),
            });
        }

        let values = layout
            .mapping
            .iter()
            .zip(&columns)
            .map(|(&field, (name, column_type))| {
                decode_field(path, config, line, name, *column_type, &record[field])
            })
            .collect::<ReadResult<Vec<_>>>()?;

        if let Err(first) = table.push_record(Record::new(values, line), config.unique_key) {
            return Err(duplicate_key(path, &table, first, line));
        }
    }

    Ok(table)
}

fn resolve_key_column(
    path: &Path,
    config: &ReaderConfig,
    schema: &Schema,
) -> ReadResult<Option<usize>> {
    match &config.key_column {
        Some(name) => schema
            .index_of(name)
            .map(Some)
            .ok_or_else(|| ReadError::UnknownColumn {
                path: path.to_path_buf(),
                column: name.clone(),
            }),
        None if schema.is_empty() => Ok(None),
        None => Ok(Some(0)),
    }
}

fn decode_field(
    path: &Path,
    config: &ReaderConfig,
    line: u64,
    column: &str,
    column_type: ColumnType,
    raw: &str,
) -> ReadResult<Value> {
    if raw.is_empty() && column_type.is_numeric() && config.empty_as_null {
        return Ok(Value::Null);
    }

    Value::coerce(raw, column_type).ok_or_else(|| ReadError::Parse {
        path: path.to_path_buf(),
        line,
        column: column.to_string(),
        raw: raw.to_string(),
        expected: column_type,
    })
}

fn duplicate_key(path: &Path, table: &Table, first: usize, line: u64) -> ReadError {
    let column = table.key_column().unwrap_or_default().to_string();
    let first_record = table.record(first);
    let key = first_record
        .zip(table.schema().index_of(&column))
        .and_then(|(rec, idx)| rec.get(idx))
        .map(|v| v.to_string())
        .unwrap_or_default();

    ReadError::DuplicateKey {
        path: path.to_path_buf(),
        column,
        key,
        line,
        first_line: first_record.map_or(0, |r| r.source_line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(rows: &[&[&str]]) -> Vec<ReadResult<RawRecord>> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| Ok((StringRecord::from(row.to_vec()), i as u64 + 2)))
            .collect()
    }

    fn hits_schema() -> Schema {
        "hit_id:int,x:float".parse().unwrap()
    }

    #[test]
    fn test_declared_layout_reorders_by_name() {
        let header = StringRecord::from(vec!["x", "hit_id"]);
        let layout = Layout::declared(Path::new("h.csv"), &hits_schema(), Some(&header)).unwrap();
        assert_eq!(layout.mapping, vec![1, 0]);

        let table = fill_table(
            Path::new("h.csv"),
            &ReaderConfig::default(),
            hits_schema(),
            &layout,
            rows(&[&["0.5", "7"]]).into_iter(),
        )
        .unwrap();
        assert_eq!(table.records()[0].values, vec![Value::Int(7), Value::Float(0.5)]);
    }

    #[test]
    fn test_declared_layout_count_mismatch() {
        let header = StringRecord::from(vec!["hit_id", "x", "y"]);
        let err = Layout::declared(Path::new("h.csv"), &hits_schema(), Some(&header)).unwrap_err();
        assert!(matches!(err, ReadError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_declared_layout_missing_name() {
        let header = StringRecord::from(vec!["hit_id", "y"]);
        let err = Layout::declared(Path::new("h.csv"), &hits_schema(), Some(&header)).unwrap_err();
        assert!(err.to_string().contains("column 'x' not found"));
    }

    #[test]
    fn test_duplicate_header_names() {
        let header = StringRecord::from(vec!["a", "b", "a"]);
        assert!(header_names(Path::new("h.csv"), &header).is_err());
    }

    #[test]
    fn test_empty_numeric_field() {
        let layout = Layout::identity(2);
        let table = fill_table(
            Path::new("h.csv"),
            &ReaderConfig::default(),
            hits_schema(),
            &layout,
            rows(&[&["1", ""]]).into_iter(),
        )
        .unwrap();
        assert!(table.records()[0].values[1].is_null());

        let strict = ReaderConfig::default().with_empty_as_null(false);
        let err = fill_table(
            Path::new("h.csv"),
            &strict,
            hits_schema(),
            &layout,
            rows(&[&["1", ""]]).into_iter(),
        )
        .unwrap_err();
        assert!(matches!(err, ReadError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_unknown_key_column() {
        let config = ReaderConfig::default().with_key_column("particle_id");
        let err = fill_table(
            Path::new("h.csv"),
            &config,
            hits_schema(),
            &Layout::identity(2),
            std::iter::empty(),
        )
        .unwrap_err();
        assert!(matches!(err, ReadError::UnknownColumn { ref column, .. } if column == "particle_id"));
    }

    #[test]
    fn test_duplicate_key_reports_both_lines() {
        let config = ReaderConfig::default().with_unique_key(true);
        let err = fill_table(
            Path::new("h.csv"),
            &config,
            hits_schema(),
            &Layout::identity(2),
            rows(&[&["1", "0.0"], &["2", "1.0"], &["1", "2.0"]]).into_iter(),
        )
        .unwrap_err();
        match err {
            ReadError::DuplicateKey {
                key,
                line,
                first_line,
                ..
            } => {
                assert_eq!(key, "1");
                assert_eq!(line, 4);
                assert_eq!(first_line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
