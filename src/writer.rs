//! Writing tables back to CSV

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ReadError, ReadResult};
use crate::model::Table;

/// Write a table to a CSV file, header first
pub fn write_csv(table: &Table, path: &Path) -> ReadResult<()> {
    let file = File::create(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_table(table, BufWriter::new(file), b',').map_err(|e| ReadError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::from(e),
    })
}

/// Write a table to any writer with the given delimiter.
///
/// Floats are written with a decimal point and nulls as empty fields, so
/// loading the output with the table's schema yields equal records.
pub fn write_table<W: Write>(table: &Table, writer: W, delimiter: u8) -> csv::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer.write_record(table.schema().names())?;
    for record in table.records() {
        csv_writer.write_record(record.values.iter().map(|v| v.display().into_owned()))?;
    }
    csv_writer.flush()?;
    Ok(())
}
