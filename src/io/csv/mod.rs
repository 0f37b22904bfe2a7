//! CSV attribute tables: one row per feature, header row required.

mod read;
mod write;

pub(crate) use read::{read_csv, read_csv_string};
pub(crate) use write::{write_csv, write_csv_string};
