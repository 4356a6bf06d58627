//! Data model for typed tabular data

mod schema;
mod table;

pub use schema::{Column, ColumnType, Schema};
pub use table::{Record, Table, Value};
