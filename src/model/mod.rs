use std::io::Read;

use serde::{Deserialize, Deserializer};

pub mod err;
pub mod instance;
pub mod point;
pub mod ride;

/// Instance and assignment files are both rows of single-space separated integers
/// with a varying number of columns.
pub(crate) fn space_separated_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

pub(crate) fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

/// Message of a deserialization failure without the csv position prefix, the callers
/// report the line themselves.
pub(crate) fn describe_csv_error(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => err.to_string(),
    }
}

/// Integer fields of an instance must fit in `i32`, so sums of coordinates, distances and
/// steps stay well inside `i64`.
pub(crate) fn narrow_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    i32::deserialize(deserializer).map(i64::from)
}
