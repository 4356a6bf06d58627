//! Column type inference from sampled rows

use csv::StringRecord;

use crate::model::{ColumnType, Schema};

/// Infer a schema from column names and a sample of rows.
///
/// Each column takes the widest type any of its non-empty sampled values
/// needs, in the order integer, float, string. Columns with no non-empty
/// sample values are strings.
///
/// `nan`, `inf` and `infinity` only make a column float when it also holds
/// real numbers; a column of nothing but such words is a string column.
pub(crate) fn infer_schema(names: Vec<String>, sample: &[(StringRecord, u64)]) -> Schema {
    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let column_type = infer_column(idx, sample).unwrap_or(ColumnType::String);
            (name, column_type)
        })
        .collect()
}

fn infer_column(idx: usize, sample: &[(StringRecord, u64)]) -> Option<ColumnType> {
    let mut inferred: Option<ColumnType> = None;
    let mut saw_non_finite = false;

    for (record, _) in sample {
        let raw = match record.get(idx) {
            Some(raw) if !raw.is_empty() => raw,
            _ => continue,
        };
        if is_non_finite_word(raw) {
            saw_non_finite = true;
            continue;
        }

        let widened = match inferred {
            Some(current) => current.widen(ColumnType::of_raw(raw)),
            None => ColumnType::of_raw(raw),
        };
        inferred = Some(widened);

        if widened == ColumnType::String {
            break;
        }
    }

    match inferred {
        None if saw_non_finite => Some(ColumnType::String),
        Some(ColumnType::Int) if saw_non_finite => Some(ColumnType::Float),
        other => other,
    }
}

/// Text such as `nan` or `-inf` that parses as a float without any digits
fn is_non_finite_word(raw: &str) -> bool {
    !raw.bytes().any(|b| b.is_ascii_digit()) && raw.parse::<f64>().is_ok()
}
