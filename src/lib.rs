//! panda-csv-reader - CSV reader for PANDA STT hit and truth data
//!
//! Loads delimited text files of detector hits, readout cells, particles and
//! truth associations into typed in-memory tables keyed by an id column.

pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod output;
pub mod reader;
pub mod writer;

pub use cache::TableCache;
pub use config::ReaderConfig;
pub use error::{ReadError, ReadResult};
pub use event::{Event, EventReader, EventSchemas, Part};
pub use model::{ColumnType, Record, Schema, Table, Value};
pub use reader::{LoadResults, TabularReader};
pub use writer::write_csv;
