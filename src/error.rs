//! Error types for table loading

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the reader
pub type ReadResult<T> = Result<T, ReadError>;

/// Failure while loading a single file.
///
/// Every variant carries the path it refers to, and line/column context where
/// one exists, so a failure can be diagnosed without re-reading the file.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The path does not exist or could not be opened for reading.
    #[error("{}: cannot open file: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Column structure of the file disagrees with the schema or header.
    #[error("{}{}: schema mismatch: {message}", .path.display(), fmt_line(.line))]
    SchemaMismatch {
        path: PathBuf,
        /// Line of the offending row, if the mismatch is row-level
        line: Option<u64>,
        message: String,
    },

    /// A field could not be coerced to its declared column type.
    #[error(
        "{}:{line}: cannot parse {raw:?} as {expected} in column '{column}'",
        .path.display()
    )]
    Parse {
        path: PathBuf,
        line: u64,
        column: String,
        raw: String,
        expected: crate::model::ColumnType,
    },

    /// A configured column (e.g. the key column) is not in the schema.
    #[error("{}: unknown column '{column}'", .path.display())]
    UnknownColumn { path: PathBuf, column: String },

    /// The key column holds the same value twice in a table that requires unique keys.
    #[error(
        "{}:{line}: duplicate key {key} in column '{column}' (first seen on line {first_line})",
        .path.display()
    )]
    DuplicateKey {
        path: PathBuf,
        column: String,
        key: String,
        line: u64,
        first_line: u64,
    },

    /// Malformed CSV at the tokenizer level (bad quoting, invalid UTF-8).
    #[error("{}{}: malformed CSV: {source}", .path.display(), fmt_line(.line))]
    Csv {
        path: PathBuf,
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },

    /// I/O failure other than opening the file (e.g. while writing).
    #[error("{}: I/O error: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReadError {
    /// Path of the file this error refers to
    pub fn path(&self) -> &Path {
        match self {
            ReadError::NotFound { path, .. }
            | ReadError::SchemaMismatch { path, .. }
            | ReadError::Parse { path, .. }
            | ReadError::UnknownColumn { path, .. }
            | ReadError::DuplicateKey { path, .. }
            | ReadError::Csv { path, .. }
            | ReadError::Io { path, .. } => path,
        }
    }

    /// Line number the error refers to, if any
    pub fn line(&self) -> Option<u64> {
        match self {
            ReadError::SchemaMismatch { line, .. } | ReadError::Csv { line, .. } => *line,
            ReadError::Parse { line, .. } | ReadError::DuplicateKey { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Short machine-readable category name
    pub fn kind(&self) -> &'static str {
        match self {
            ReadError::NotFound { .. } => "not_found",
            ReadError::SchemaMismatch { .. } => "schema_mismatch",
            ReadError::Parse { .. } => "parse",
            ReadError::UnknownColumn { .. } => "unknown_column",
            ReadError::DuplicateKey { .. } => "duplicate_key",
            ReadError::Csv { .. } => "csv",
            ReadError::Io { .. } => "io",
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        ReadError::Csv {
            path: path.to_path_buf(),
            line: source.position().map(|p| p.line()),
            source,
        }
    }
}

fn fmt_line(line: &Option<u64>) -> String {
    line.map(|l| format!(":{}", l)).unwrap_or_default()
}
