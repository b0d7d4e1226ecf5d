//! Error types for the student records engine
//!
//! This module defines every error that can occur while validating, guarding,
//! persisting, importing or exporting student records.
//!
//! # Error Categories
//!
//! - **Format Errors**: a field fails its format or closed-set check
//! - **Transition Errors**: a status change the rule table does not allow,
//!   or a stored status the table does not know
//! - **Store Errors**: duplicate identifier/email, unknown identifier
//! - **Import Errors**: a failure tagged with the row it came from
//! - **I/O and Parse Errors**: unreadable files, malformed CSV or JSON

use thiserror::Error;

/// Machine-checkable classification of a [`RecordError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    MissingField,
    IllegalTransition,
    UnknownStatus,
    DuplicateKey,
    NotFound,
    RowImport,
    Io,
    Parse,
}

/// Main error type for the records engine
///
/// Each variant carries the context needed to build a human-readable
/// message for the client; [`RecordError::kind`] gives the category.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// A field present in the payload failed its format rule
    ///
    /// Detected before any persistence call.
    #[error("Invalid {field}: {reason}")]
    Format {
        /// Name of the failing field
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A field required to create a record is absent
    #[error("Missing required field '{field}'")]
    MissingField {
        /// Name of the absent field
        field: String,
    },

    /// The status rule table does not allow this change
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition {
        /// Current status of the stored record
        from: String,
        /// Requested status
        to: String,
    },

    /// The current status is not in the rule table
    ///
    /// This is a data-integrity problem with the stored record, not a
    /// problem with the requested change.
    #[error("unknown current status '{status}'")]
    UnknownStatus {
        /// The unrecognized status value
        status: String,
    },

    /// Identifier or email collides with another record
    #[error("Duplicate {field} '{value}'")]
    DuplicateKey {
        /// `id` or `email`
        field: String,
        /// The colliding value
        value: String,
    },

    /// No record with this identifier
    #[error("Record '{id}' not found")]
    NotFound {
        /// The identifier that was looked up
        id: String,
    },

    /// A failure of a single row during bulk import
    #[error("Row {row}: {source}")]
    RowImport {
        /// 1-based data row index (the header is not counted)
        row: usize,
        /// The underlying failure
        source: Box<RecordError>,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// Malformed CSV or JSON input
    #[error("Parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for RecordError {
    fn from(error: std::io::Error) -> Self {
        RecordError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for RecordError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        RecordError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl From<csv_async::Error> for RecordError {
    fn from(error: csv_async::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        RecordError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(error: serde_json::Error) -> Self {
        let line = match error.line() {
            0 => None,
            l => Some(l as u64),
        };

        RecordError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl RecordError {
    /// Create a Format error
    pub fn format(field: &str, reason: impl Into<String>) -> Self {
        RecordError::Format {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: &str) -> Self {
        RecordError::MissingField {
            field: field.to_string(),
        }
    }

    /// Create an IllegalTransition error
    pub fn illegal_transition(from: &str, to: &str) -> Self {
        RecordError::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Create an UnknownStatus error
    pub fn unknown_status(status: &str) -> Self {
        RecordError::UnknownStatus {
            status: status.to_string(),
        }
    }

    /// Create a DuplicateKey error
    pub fn duplicate_key(field: &str, value: &str) -> Self {
        RecordError::DuplicateKey {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(id: &str) -> Self {
        RecordError::NotFound { id: id.to_string() }
    }

    /// Wrap an error with the import row it came from
    pub fn at_row(self, row: usize) -> Self {
        RecordError::RowImport {
            row,
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RecordError::Format { .. } => ErrorKind::Format,
            RecordError::MissingField { .. } => ErrorKind::MissingField,
            RecordError::IllegalTransition { .. } => ErrorKind::IllegalTransition,
            RecordError::UnknownStatus { .. } => ErrorKind::UnknownStatus,
            RecordError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            RecordError::NotFound { .. } => ErrorKind::NotFound,
            RecordError::RowImport { .. } => ErrorKind::RowImport,
            RecordError::Io { .. } => ErrorKind::Io,
            RecordError::Parse { .. } => ErrorKind::Parse,
        }
    }

    /// Name of the field this error is about, if any
    ///
    /// Looks through `RowImport` to the wrapped error.
    pub fn field(&self) -> Option<&str> {
        match self {
            RecordError::Format { field, .. }
            | RecordError::MissingField { field }
            | RecordError::DuplicateKey { field, .. } => Some(field),
            RecordError::IllegalTransition { .. } | RecordError::UnknownStatus { .. } => {
                Some("status")
            }
            RecordError::RowImport { source, .. } => source.field(),
            _ => None,
        }
    }

    /// HTTP status the routing layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            RecordError::Format { .. }
            | RecordError::MissingField { .. }
            | RecordError::IllegalTransition { .. }
            | RecordError::UnknownStatus { .. }
            | RecordError::Parse { .. } => 400,
            RecordError::DuplicateKey { .. } => 409,
            RecordError::NotFound { .. } => 404,
            RecordError::RowImport { source, .. } => source.status_code(),
            RecordError::Io { .. } => 500,
        }
    }
}
