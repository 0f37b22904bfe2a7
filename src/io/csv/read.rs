//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path, sync::Arc};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader, DataType, Field, Schema, SchemaRef}};

/// Reads a CSV file from `path` into a Polars DataFrame.
/// The id column, when named, is forced to text so identifiers keep leading zeros.
pub(crate) fn read_csv(path: &Path, id_column: Option<&str>) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReader::new(file)
        .with_options(csv_options(id_column))
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads a CSV from a string.
pub(crate) fn read_csv_string(csv: &str, id_column: Option<&str>) -> Result<DataFrame> {
    CsvReader::new(Cursor::new(csv.as_bytes()))
        .with_options(csv_options(id_column))
        .finish()
        .context("[io::csv::read] Failed to read CSV from string")
}

fn csv_options(id_column: Option<&str>) -> CsvReadOptions {
    let options = CsvReadOptions::default().with_has_header(true);
    match id_column {
        Some(column) => options.with_schema_overwrite(Some(id_schema(column))),
        None => options,
    }
}

/// Schema overwrite keeping the id column as a string.
fn id_schema(column: &str) -> SchemaRef {
    Arc::new(Schema::from_iter([Field::new(column.into(), DataType::String)]))
}
