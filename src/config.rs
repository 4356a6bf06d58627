//! Configuration handling for the tabular reader

/// Output format for load summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for load operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Field delimiter byte
    pub delimiter: u8,
    /// Whether the first line names the columns
    pub has_headers: bool,
    /// Column to index rows by; the first column when unset
    pub key_column: Option<String>,
    /// Reject tables whose key column holds duplicate values
    pub unique_key: bool,
    /// Treat empty fields in numeric columns as null instead of a parse error
    pub empty_as_null: bool,
    /// Number of rows sampled for type inference; all rows when unset
    pub infer_sample_rows: Option<usize>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            key_column: None,
            unique_key: false,
            empty_as_null: true,
            infer_sample_rows: None,
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether the first line is a header
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set the key column by name
    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    /// Require key values to be unique
    pub fn with_unique_key(mut self, unique: bool) -> Self {
        self.unique_key = unique;
        self
    }

    /// Set how empty numeric fields are handled
    pub fn with_empty_as_null(mut self, empty_as_null: bool) -> Self {
        self.empty_as_null = empty_as_null;
        self
    }

    /// Limit the rows sampled for type inference
    pub fn with_infer_sample_rows(mut self, rows: usize) -> Self {
        self.infer_sample_rows = Some(rows);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ReaderConfig::new()
            .with_delimiter(b'\t')
            .with_key_column("particle_id")
            .with_unique_key(true);
        assert_eq!(config.delimiter, b'\t');
        assert_eq!(config.key_column.as_deref(), Some("particle_id"));
        assert!(config.unique_key);
        assert!(config.has_headers);
        assert!(config.empty_as_null);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
