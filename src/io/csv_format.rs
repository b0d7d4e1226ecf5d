//! CSV format handling for record import and export
//!
//! This module centralizes all CSV format concerns:
//! - reader configuration shared by the sync and async readers
//! - conversion of raw CSV rows to import rows
//! - record export with a header taken from the record's field names
//!
//! Parsing and writing functions are pure over `Read`/`Write`, so they can be
//! tested without touching the file system.

use crate::types::{ImportRow, Record, RecordError};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// CSV columns of an exported record, in `Record` declaration order
pub const RECORD_FIELDS: [&str; 13] = [
    "id",
    "full_name",
    "date_of_birth",
    "gender",
    "faculty",
    "course",
    "program",
    "address",
    "email",
    "phone",
    "status",
    "created_at",
    "updated_at",
];

/// Raw CSV row keyed by header name
pub type CsvRow = BTreeMap<String, String>;

/// CSV reader configured the way every import reads files
///
/// - Trim whitespace from headers and fields
/// - Accept rows of any length while reading; a row shorter than the header
///   fails to deserialize and is reported as a `Parse` row error
pub fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .buffer_capacity(8 * 1024)
        .from_reader(input)
}

/// Convert a raw CSV row into an import row
///
/// Empty cells stay present as empty strings; the validator decides whether
/// that is acceptable for the field.
pub fn convert_csv_row(row: CsvRow) -> ImportRow {
    ImportRow::from(row)
}

/// Parse CSV text into numbered rows
///
/// Malformed rows become per-row errors; the other rows are still returned.
/// Row numbers are 1-based and do not count the header.
pub fn parse_csv_rows<R: Read>(input: R) -> Vec<(usize, Result<ImportRow, RecordError>)> {
    let mut reader = csv_reader(input);

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(index, result)| {
            (
                index + 1,
                result.map(convert_csv_row).map_err(RecordError::from),
            )
        })
        .collect()
}

/// Write records as CSV
///
/// The header row is always written, even for an empty slice, so exports
/// stay importable. Records are written in the order given.
pub fn write_records_csv(records: &[Record], output: &mut dyn Write) -> Result<(), RecordError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);

    writer.write_record(RECORD_FIELDS)?;

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;

    Ok(())
}
