//! Synchronous import strategy
//!
//! Single-threaded implementation of the ImportStrategy trait.
//!
//! # Design
//!
//! The SyncImportStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface, one row at a time)
//! - JSON parsing to `json_format::parse_json_rows` (whole document)
//! - Row import to `strategy::import_rows` (validate, guard, upsert)
//!
//! CSV input is streamed, so memory use is bounded by the store, not by the
//! file. A JSON document has to be parsed as a whole before the first row can
//! be imported.

use crate::core::RecordService;
use crate::io::files::{read_text, FileFormat};
use crate::io::json_format::parse_json_rows;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{import_rows, log_summary, ImportStrategy};
use crate::types::{ImportReport, RecordError};
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct SyncImportStrategy;

impl ImportStrategy for SyncImportStrategy {
    fn import(
        &self,
        input: &Path,
        format: FileFormat,
        service: &RecordService,
    ) -> Result<ImportReport, RecordError> {
        let report = match format {
            FileFormat::Csv => import_rows(service, SyncReader::new(input)?),
            FileFormat::Json => import_rows(service, parse_json_rows(&read_text(input)?)?),
        };

        log_summary("sync", &report);
        Ok(report)
    }
}
