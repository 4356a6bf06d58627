//! Loading delimited text files into tables

mod decode;
mod infer;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::config::ReaderConfig;
use crate::error::{ReadError, ReadResult};
use crate::model::{Schema, Table};

use self::decode::{fill_table, generated_names, header_names, Layout, RawRecord};
use self::infer::infer_schema;

/// Results of loading several files, in input order
pub type LoadResults = IndexMap<PathBuf, ReadResult<Table>>;

/// Single-pass loader from CSV files to tables.
///
/// The reader holds only configuration, so one instance can be shared
/// across threads and reused for any number of files.
#[derive(Debug, Clone, Default)]
pub struct TabularReader {
    config: ReaderConfig,
}

impl TabularReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Load one file.
    ///
    /// Without a schema, column names come from the header and column types
    /// are inferred from the data. With one, the file must have exactly the
    /// schema's columns and every field must coerce to its declared type.
    pub fn load(&self, path: &Path, schema: Option<&Schema>) -> ReadResult<Table> {
        let file = open(path)?;
        let mut csv_reader = ::csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(self.config.has_headers)
            .flexible(true)
            .trim(::csv::Trim::All)
            .from_reader(BufReader::new(file));

        let header = if self.config.has_headers {
            let header = csv_reader
                .headers()
                .map_err(|e| ReadError::csv(path, e))?
                .clone();
            Some(header)
        } else {
            None
        };

        let mut records = csv_reader.into_records().map(|result| {
            result
                .map(|record| {
                    let line = record.position().map_or(0, |p| p.line());
                    (record, line)
                })
                .map_err(|e| ReadError::csv(path, e))
        });

        let table = match schema {
            Some(schema) => {
                let layout = Layout::declared(path, schema, header.as_ref())?;
                fill_table(path, &self.config, schema.clone(), &layout, records)?
            }
            None => {
                let limit = match (self.config.infer_sample_rows, header.is_some()) {
                    (Some(n), true) => n,
                    // Without a header, the first row fixes the column count
                    (Some(n), false) => n.max(1),
                    (None, _) => usize::MAX,
                };
                let sample = records
                    .by_ref()
                    .take(limit)
                    .collect::<ReadResult<Vec<RawRecord>>>()?;

                let names = match &header {
                    Some(header) => header_names(path, header)?,
                    None => generated_names(sample.first().map_or(0, |(r, _)| r.len())),
                };
                let layout = Layout::identity(names.len());
                let schema = infer_schema(names, &sample);
                trace!("Inferred schema for {}: {}", path.display(), schema);

                fill_table(
                    path,
                    &self.config,
                    schema,
                    &layout,
                    sample.into_iter().map(Ok).chain(records),
                )?
            }
        };

        debug!(
            "Loaded {} rows x {} columns from {}",
            table.row_count(),
            table.column_count(),
            path.display()
        );

        Ok(table)
    }

    /// Load each path independently.
    ///
    /// A failure on one path is recorded in its entry and does not affect
    /// the others.
    pub fn load_many<I, P>(&self, paths: I, schema: Option<&Schema>) -> LoadResults
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(|p| {
                let path = p.as_ref();
                (path.to_path_buf(), self.load_logged(path, schema))
            })
            .collect()
    }

    /// Same as [`load_many`](Self::load_many), one rayon task per path
    pub fn load_many_par<P>(&self, paths: &[P], schema: Option<&Schema>) -> LoadResults
    where
        P: AsRef<Path> + Sync,
    {
        let loaded: Vec<_> = paths
            .par_iter()
            .map(|p| {
                let path = p.as_ref();
                (path.to_path_buf(), self.load_logged(path, schema))
            })
            .collect();
        loaded.into_iter().collect()
    }

    fn load_logged(&self, path: &Path, schema: Option<&Schema>) -> ReadResult<Table> {
        let result = self.load(path, schema);
        if let Err(e) = &result {
            warn!("{}", e);
        }
        result
    }
}

fn open(path: &Path) -> ReadResult<File> {
    if path.is_dir() {
        return Err(ReadError::NotFound {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "is a directory"),
        });
    }
    File::open(path).map_err(|source| ReadError::NotFound {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::model::{ColumnType, Value};

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_infers_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "hits.csv", "hit_id,x,y,z\n1,0.0,1.0,2.0\n2,3.0,4.0,5.0\n");

        let table = TabularReader::default().load(&path, None).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.schema().to_string(), "hit_id:int,x:float,y:float,z:float");
        assert_eq!(table.key_column(), Some("hit_id"));
        assert_eq!(
            table.get(&Value::Int(1)).and_then(|r| r.get(1)),
            Some(&Value::Float(0.0))
        );
    }

    #[test]
    fn test_load_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "raw.csv", "1,a\n2,b\n");
        let reader = TabularReader::new(ReaderConfig::default().with_headers(false));

        let table = reader.load(&path, None).unwrap();
        assert_eq!(table.schema().to_string(), "column_0:int,column_1:string");
        assert_eq!(table.records()[0].source_line, 1);
    }

    #[test]
    fn test_sample_limit_makes_late_text_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "s.csv", "id,v\n1,2\n2,3\n3,oops\n");
        let reader = TabularReader::new(ReaderConfig::default().with_infer_sample_rows(2));

        let err = reader.load(&path, None).unwrap_err();
        assert!(matches!(err, ReadError::Parse { line: 4, ref column, .. } if column == "v"));
    }

    #[test]
    fn test_load_tab_delimited() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "t.tsv", "particle_id\tq\n10\t-1\n");
        let reader = TabularReader::new(ReaderConfig::default().with_delimiter(b'\t'));
        assert_eq!(reader.config().delimiter, b'\t');

        let table = reader.load(&path, None).unwrap();
        assert_eq!(table.schema().type_of("q"), Some(ColumnType::Int));
        assert_eq!(table.value(0, "q"), Some(&Value::Int(-1)));
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = TabularReader::default().load(dir.path(), None).unwrap_err();
        assert!(matches!(err, ReadError::NotFound { .. }));
    }

    #[test]
    fn test_load_many_par_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a.csv", "id\n1\n");
        let b = dir.path().join("missing.csv");
        let c = write_file(&dir, "c.csv", "id\n3\n");

        let results = TabularReader::default().load_many_par(&[a.clone(), b.clone(), c.clone()], None);
        let keys: Vec<_> = results.keys().cloned().collect();
        assert_eq!(keys, vec![a, b.clone(), c]);
        assert!(matches!(results[&b], Err(ReadError::NotFound { .. })));
    }
}
