//! Shapefile attribute-table reading. Geometry is read but discarded.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use shapefile::{Reader, dbase::{self, FieldValue, Record}};

/// Field names of the `.dbf` sidecar of `path`, in schema order.
pub(crate) fn read_field_names(path: &Path) -> Result<Vec<String>> {
    let dbf = path.with_extension("dbf");
    let reader = dbase::Reader::from_path(&dbf)
        .with_context(|| format!("[io::shp] Failed to open attribute table: {}", dbf.display()))?;
    Ok(reader.fields().iter().map(|field| field.name().to_string()).collect())
}

/// Reads all attribute records from a given `.shp` file path (its `.dbf` sidecar).
pub(crate) fn read_shapefile_records(path: &Path) -> Result<Vec<Record>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut records = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (_, record) = result.context("[io::shp] Error reading shape+record")?;
        records.push(record);
    }
    Ok(records)
}

/// Read a shapefile's attribute table, columns in `.dbf` field order.
pub(crate) fn read_shapefile(path: &Path) -> Result<DataFrame> {
    let fields = read_field_names(path)?;
    records_to_dataframe(&fields, &read_shapefile_records(path)?)
}

/// Numeric value of a dBASE field, `None` for nulls and non-numeric kinds.
fn numeric_value(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Numeric(n) => *n,
        FieldValue::Float(f) => f.map(f64::from),
        FieldValue::Integer(i) => Some(f64::from(*i)),
        FieldValue::Double(d) => Some(*d),
        FieldValue::Currency(c) => Some(*c),
        _ => None,
    }
}

/// True for dBASE field kinds stored as numbers.
fn is_numeric_field(value: &FieldValue) -> bool {
    matches!(value,
        FieldValue::Numeric(_) | FieldValue::Float(_) | FieldValue::Integer(_)
        | FieldValue::Double(_) | FieldValue::Currency(_))
}

/// Text value of a dBASE field, trimmed of dBASE padding.
fn text_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(Some(s)) => Some(s.trim().to_string()),
        FieldValue::Memo(s) => Some(s.trim().to_string()),
        other => numeric_value(other).map(|n| n.to_string()),
    }
}

/// Convert dBASE records to a DataFrame with one column per entry of `fields`,
/// in that order. Fields whose values are all numeric become Float64 columns,
/// the rest String.
pub(crate) fn records_to_dataframe(fields: &[String], records: &[Record]) -> Result<DataFrame> {
    let columns = fields.iter()
        .map(|name| {
            let numeric = records.iter()
                .all(|record| record.get(name).is_none_or(is_numeric_field));

            if numeric {
                Column::new(name.as_str().into(), records.iter()
                    .map(|record| record.get(name).and_then(numeric_value))
                    .collect::<Vec<Option<f64>>>())
            } else {
                Column::new(name.as_str().into(), records.iter()
                    .map(|record| record.get(name).and_then(text_value))
                    .collect::<Vec<Option<String>>>())
            }
        })
        .collect::<Vec<_>>();

    DataFrame::new(columns).context("[io::shp] Failed to build attribute table")
}
