//! Parquet attribute tables, behind the `parquet` feature.

mod read;
mod write;

pub(crate) use read::read_parquet;
pub(crate) use write::write_parquet;
