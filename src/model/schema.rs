//! Column metadata and type information

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scalar type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    String,
}

impl ColumnType {
    /// Widen the type to accommodate another type.
    ///
    /// The lattice is `Int < Float < String`.
    pub fn widen(self, other: ColumnType) -> ColumnType {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnType::String, _) | (_, ColumnType::String) => ColumnType::String,
            _ => ColumnType::Float,
        }
    }

    /// Narrowest type that can hold the raw text, tried in the order
    /// integer, float, string.
    ///
    /// Anything `f64` parses is a float here, including `nan` and `inf`;
    /// column inference only trusts those words next to real numbers.
    pub fn of_raw(raw: &str) -> ColumnType {
        if raw.parse::<i64>().is_ok() {
            ColumnType::Int
        } else if raw.parse::<f64>().is_ok() {
            ColumnType::Float
        } else {
            ColumnType::String
        }
    }

    /// Whether this is a numeric type
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Int => write!(f, "int"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::String => write!(f, "string"),
        }
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "int" | "integer" | "i64" => Ok(ColumnType::Int),
            "float" | "double" | "f64" => Ok(ColumnType::Float),
            "str" | "string" => Ok(ColumnType::String),
            other => Err(format!("Unknown column type: {}", other)),
        }
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (from header or schema)
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
    /// Declared or inferred type
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, index: usize, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            index,
            column_type,
        }
    }
}

/// Ordered mapping from column name to type.
///
/// Column order is significant: records store their values in schema order.
/// Names are unique; inserting an existing name replaces its type in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: IndexMap<String, ColumnType>,
}

// IndexMap equality ignores order; schemas are equal only column by column
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns.iter().eq(other.columns.iter())
    }
}

impl Eq for Schema {}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, builder style
    pub fn with_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.push(name, column_type);
        self
    }

    /// Append a column
    pub fn push(&mut self, name: impl Into<String>, column_type: ColumnType) {
        self.columns.insert(name.into(), column_type);
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    /// Type of a column by name
    pub fn type_of(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).copied()
    }

    /// Column names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Column metadata in order
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, (name, ty))| Column::new(name.clone(), i, *ty))
    }

    /// Column at a position
    pub fn get(&self, index: usize) -> Option<(&str, ColumnType)> {
        self.columns
            .get_index(index)
            .map(|(name, ty)| (name.as_str(), *ty))
    }
}

impl<N: Into<String>> FromIterator<(N, ColumnType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (N, ColumnType)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, ty) in iter {
            schema.push(name, ty);
        }
        schema
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, ty)) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", name, ty)?;
        }
        Ok(())
    }
}

/// Parses `name:type,name:type`
impl FromStr for Schema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut schema = Schema::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, ty) = part
                .split_once(':')
                .ok_or_else(|| format!("Expected name:type, got '{}'", part))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(format!("Empty column name in '{}'", part));
            }
            if schema.index_of(name).is_some() {
                return Err(format!("Duplicate column name: {}", name));
            }
            schema.push(name, ty.parse()?);
        }
        if schema.is_empty() {
            return Err("Schema has no columns".to_string());
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen() {
        assert_eq!(ColumnType::Int.widen(ColumnType::Int), ColumnType::Int);
        assert_eq!(ColumnType::Int.widen(ColumnType::Float), ColumnType::Float);
        assert_eq!(ColumnType::Float.widen(ColumnType::Int), ColumnType::Float);
        assert_eq!(ColumnType::Int.widen(ColumnType::String), ColumnType::String);
        assert_eq!(ColumnType::String.widen(ColumnType::Float), ColumnType::String);
    }

    #[test]
    fn test_of_raw_order() {
        assert_eq!(ColumnType::of_raw("42"), ColumnType::Int);
        assert_eq!(ColumnType::of_raw("-7"), ColumnType::Int);
        assert_eq!(ColumnType::of_raw("3.5"), ColumnType::Float);
        assert_eq!(ColumnType::of_raw("1e-3"), ColumnType::Float);
        assert_eq!(ColumnType::of_raw("abc"), ColumnType::String);
    }

    #[test]
    fn test_schema_parse_and_display() {
        let schema: Schema = "hit_id:int, x:float,volume:string".parse().unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.index_of("x"), Some(1));
        assert_eq!(schema.type_of("volume"), Some(ColumnType::String));
        assert_eq!(schema.to_string(), "hit_id:int,x:float,volume:string");
    }

    #[test]
    fn test_schema_parse_errors() {
        assert!("hit_id".parse::<Schema>().is_err());
        assert!("hit_id:bool".parse::<Schema>().is_err());
        assert!("a:int,a:float".parse::<Schema>().is_err());
        assert!("".parse::<Schema>().is_err());
    }

    #[test]
    fn test_schema_preserves_order() {
        let schema: Schema = [("z", ColumnType::Float), ("a", ColumnType::Int)]
            .into_iter()
            .collect();
        let names: Vec<_> = schema.names().collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(schema.get(1), Some(("a", ColumnType::Int)));

        let reversed: Schema = "a:int,z:float".parse().unwrap();
        assert_ne!(schema, reversed);
    }
}
