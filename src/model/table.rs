//! Table, Record, and Value data structures

use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::schema::{ColumnType, Schema};

/// A typed scalar field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    String(String),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Int(i) => i.hash(state),
            Value::Float(f) => {
                // Keep Hash consistent with Eq for 0.0 / -0.0 and NaN
                let bits = if *f == 0.0 {
                    0
                } else if f.is_nan() {
                    f64::NAN.to_bits()
                } else {
                    f.to_bits()
                };
                bits.hash(state)
            }
            Value::String(s) => s.hash(state),
        }
    }
}

impl Value {
    /// Coerce raw field text to the given column type.
    ///
    /// Returns `None` if the text is not a valid value of that type. Empty
    /// text is not handled here; the reader decides what an empty field means.
    pub fn coerce(raw: &str, column_type: ColumnType) -> Option<Value> {
        match column_type {
            ColumnType::Int => raw.parse().ok().map(Value::Int),
            ColumnType::Float => raw.parse().ok().map(Value::Float),
            ColumnType::String => Some(Value::String(raw.to_string())),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as f64 (integers are widened)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to CSV field text.
    ///
    /// Finite floats always carry a decimal point so the text re-infers as float.
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Int(i) => Cow::Owned(i.to_string()),
            Value::Float(f) => {
                let s = f.to_string();
                if f.is_finite() && !s.contains('.') {
                    Cow::Owned(format!("{}.0", s))
                } else {
                    Cow::Owned(s)
                }
            }
            Value::String(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Values in schema order
    pub values: Vec<Value>,
    /// Line number in the source file (1-indexed, header counts as line 1)
    pub source_line: u64,
}

impl Record {
    pub fn new(values: Vec<Value>, source_line: u64) -> Self {
        Self {
            values,
            source_line,
        }
    }

    /// Get a value by column index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Records sharing one schema, indexed by a key column
#[derive(Debug, Clone)]
pub struct Table {
    schema: Schema,
    records: Vec<Record>,
    key_column: Option<usize>,
    key_index: FxHashMap<Value, Vec<usize>>,
}

impl Table {
    /// Create an empty table keyed by the given column
    pub(crate) fn new(schema: Schema, key_column: Option<usize>) -> Self {
        Self {
            schema,
            records: Vec::new(),
            key_column,
            key_index: FxHashMap::default(),
        }
    }

    /// Append a record.
    ///
    /// If `unique` is set and the key is already present, the record is not
    /// added and the row index of the earlier record is returned as the error.
    pub(crate) fn push_record(&mut self, record: Record, unique: bool) -> Result<(), usize> {
        debug_assert_eq!(record.len(), self.schema.len());
        let idx = self.records.len();
        if let Some(key) = self.key_column.and_then(|k| record.get(k)) {
            let rows = self.key_index.entry(key.clone()).or_default();
            if unique {
                if let Some(&first) = rows.first() {
                    return Err(first);
                }
            }
            rows.push(idx);
        }
        self.records.push(record);
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Record by row index
    pub fn record(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Name of the key column
    pub fn key_column(&self) -> Option<&str> {
        self.key_column
            .and_then(|k| self.schema.get(k))
            .map(|(name, _)| name)
    }

    /// First record with the given key
    pub fn get(&self, key: &Value) -> Option<&Record> {
        self.key_index
            .get(key)
            .and_then(|rows| rows.first())
            .map(|&idx| &self.records[idx])
    }

    /// All records with the given key, in file order
    pub fn get_all<'a>(&'a self, key: &Value) -> impl Iterator<Item = &'a Record> + 'a {
        self.key_index
            .get(key)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.records[idx])
    }

    /// Whether every key value occurs exactly once
    pub fn has_unique_keys(&self) -> bool {
        self.key_index.values().all(|rows| rows.len() == 1)
    }

    /// Number of distinct key values
    pub fn key_count(&self) -> usize {
        self.key_index.len()
    }

    /// Get a value by row index and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.schema.index_of(column)?;
        self.records.get(row).and_then(|r| r.get(col))
    }

    /// All values of one column, in row order
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let col = self.schema.index_of(column)?;
        Some(self.records.iter().map(move |r| &r.values[col]))
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
