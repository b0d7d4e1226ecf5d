//! File I/O for import and export
//!
//! Whole-file text reads and writes, format detection from the file
//! extension, and format dispatch over the CSV and JSON modules.

use crate::io::csv_format::{parse_csv_rows, write_records_csv};
use crate::io::json_format::{parse_json_rows, write_records_json};
use crate::types::{ImportRow, Record, RecordError};
use clap::ValueEnum;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// External file formats for import and export
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    /// Detect the format from the file extension (case-insensitive)
    ///
    /// # Errors
    ///
    /// `Format` on `format` when the extension is missing or unsupported.
    pub fn from_path(path: &Path) -> Result<Self, RecordError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(FileFormat::Csv),
            Some("json") => Ok(FileFormat::Json),
            _ => Err(RecordError::format(
                "format",
                format!("cannot detect file format of '{}'", path.display()),
            )),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "csv"),
            FileFormat::Json => write!(f, "json"),
        }
    }
}

/// Read the full content of a file as text
pub fn read_text(path: &Path) -> Result<String, RecordError> {
    std::fs::read_to_string(path).map_err(|e| RecordError::Io {
        message: format!("Failed to read '{}': {}", path.display(), e),
    })
}

/// Write text to a file, replacing any existing content
pub fn write_text(path: &Path, text: &str) -> Result<(), RecordError> {
    std::fs::write(path, text).map_err(|e| RecordError::Io {
        message: format!("Failed to write '{}': {}", path.display(), e),
    })
}

/// Parse import text in the given format into numbered rows
///
/// CSV never fails as a whole (bad rows become row errors); JSON fails when
/// the document itself is unusable.
pub fn parse_rows(
    text: &str,
    format: FileFormat,
) -> Result<Vec<(usize, Result<ImportRow, RecordError>)>, RecordError> {
    match format {
        FileFormat::Csv => Ok(parse_csv_rows(text.as_bytes())),
        FileFormat::Json => parse_json_rows(text),
    }
}

/// Write records in the given format
pub fn export_records(
    records: &[Record],
    format: FileFormat,
    output: &mut dyn Write,
) -> Result<(), RecordError> {
    match format {
        FileFormat::Csv => write_records_csv(records, output),
        FileFormat::Json => write_records_json(records, output),
    }
}

/// Render records in the given format as text
pub fn export_to_string(records: &[Record], format: FileFormat) -> Result<String, RecordError> {
    let mut buffer = Vec::new();
    export_records(records, format, &mut buffer)?;

    String::from_utf8(buffer).map_err(|e| RecordError::Io {
        message: format!("export produced invalid UTF-8: {}", e),
    })
}

/// Export records to a file
pub fn export_to_file(records: &[Record], format: FileFormat, path: &Path) -> Result<(), RecordError> {
    let file = File::create(path).map_err(|e| RecordError::Io {
        message: format!("Failed to create '{}': {}", path.display(), e),
    })?;

    let mut writer = BufWriter::new(file);
    export_records(records, format, &mut writer)?;
    writer.flush()?;

    Ok(())
}
