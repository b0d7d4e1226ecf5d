//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over import rows from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader wraps a `csv::Reader` configured by `csv_format::csv_reader`
//! and deserializes one row at a time, so memory use does not grow with the
//! file size.
//!
//! ```no_run
//! use student_records::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("students.csv")).unwrap();
//! for (row, result) in reader {
//!     match result {
//!         Ok(payload) => println!("row {}: {:?}", row, payload.get("id")),
//!         Err(e) => eprintln!("row {}: {}", row, e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, permission denied) are returned from `new()`
//! - Malformed rows are yielded as `Err` with their row number, and iteration
//!   continues with the next row

use crate::io::csv_format::{convert_csv_row, csv_reader, CsvRow};
use crate::types::{ImportRow, RecordError};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader yielding `(row, result)` pairs
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    row: usize,
}

impl SyncReader {
    /// Open a CSV file for streaming iteration
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, RecordError> {
        let file = File::open(path).map_err(|e| RecordError::Io {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        Ok(Self {
            reader: csv_reader(file),
            row: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = (usize, Result<ImportRow, RecordError>);

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.reader.deserialize::<CsvRow>().next()?;
        self.row += 1;

        Some((
            self.row,
            result.map(convert_csv_row).map_err(RecordError::from),
        ))
    }
}
