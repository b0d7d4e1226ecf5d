//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `record`: the stored student record and its closed-set enums
//! - `payload`: raw field maps from requests and import files
//! - `report`: bulk import outcome
//! - `error`: error types for the records engine

pub mod error;
pub mod payload;
pub mod record;
pub mod report;

pub use error::{ErrorKind, RecordError};
pub use payload::{ImportRow, RecordPayload};
pub use record::{
    Faculty, Gender, Record, RecordId, RecordPatch, StudentStatus, DATE_FORMAT, REQUIRED_FIELDS,
};
pub use report::{ImportReport, RowError, RowOutcome};
