//! JSON format handling for record import and export
//!
//! An import file is a single JSON array whose elements are record objects.
//! A document that is not valid JSON, or not an array, is fatal for the
//! whole import; an element that is not a usable object only rejects that
//! row.

use crate::types::{ImportRow, Record, RecordError};
use serde_json::Value;
use std::io::Write;

/// Parse a JSON array into numbered rows
///
/// Row numbers are the 1-based positions of the elements in the array.
///
/// # Errors
///
/// `Parse` if the text is not JSON or the top-level value is not an array.
pub fn parse_json_rows(
    text: &str,
) -> Result<Vec<(usize, Result<ImportRow, RecordError>)>, RecordError> {
    let document: Value = serde_json::from_str(text)?;

    let elements = match document {
        Value::Array(elements) => elements,
        _ => {
            return Err(RecordError::Parse {
                line: None,
                message: "expected a JSON array of records".to_string(),
            })
        }
    };

    Ok(elements
        .iter()
        .enumerate()
        .map(|(index, element)| (index + 1, ImportRow::from_json_value(element)))
        .collect())
}

/// Write records as a pretty-printed JSON array followed by a newline
pub fn write_records_json(records: &[Record], output: &mut dyn Write) -> Result<(), RecordError> {
    serde_json::to_writer_pretty(&mut *output, records)?;
    output.write_all(b"\n")?;
    output.flush()?;

    Ok(())
}
