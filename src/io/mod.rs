//! I/O module
//!
//! Handles import parsing and export writing.
//!
//! # Components
//!
//! - `csv_format` - CSV reader configuration, row conversion, record export
//! - `json_format` - JSON array parsing and pretty-printed export
//! - `files` - File formats, whole-file text I/O, format dispatch
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod files;
pub mod json_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{write_records_csv, RECORD_FIELDS};
pub use files::{
    export_records, export_to_file, export_to_string, parse_rows, read_text, write_text,
    FileFormat,
};
pub use json_format::write_records_json;
pub use sync_reader::SyncReader;
