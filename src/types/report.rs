//! Bulk import report types

use super::error::RecordError;
use super::record::RecordId;
use serde::Serialize;

/// A rejected row of an import batch
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based data row index (the header row is not counted)
    pub row: usize,
    pub error: RecordError,
}

impl RowError {
    pub fn new(row: usize, error: RecordError) -> Self {
        Self { row, error }
    }

    /// Field the rejection is about, if the error names one
    pub fn field(&self) -> Option<&str> {
        self.error.field()
    }

    pub fn into_error(self) -> RecordError {
        self.error.at_row(self.row)
    }
}

impl Serialize for RowError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("RowError", 4)?;
        state.serialize_field("row", &self.row)?;
        state.serialize_field("kind", &format!("{:?}", self.error.kind()))?;
        state.serialize_field("field", &self.field())?;
        state.serialize_field("reason", &self.error.to_string())?;
        state.end()
    }
}

/// Result of importing a single row
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    /// 1-based data row index
    pub row: usize,

    /// Identifier of the created/updated record, or why the row was rejected
    pub result: Result<RecordId, RecordError>,
}

/// Outcome of a bulk import
///
/// Partial success is the normal case: both lists are filled in row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Identifiers of rows that were created or updated
    pub imported: Vec<RecordId>,
    /// Rows that were rejected, with the reason
    pub rejected: Vec<RowError>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows seen
    pub fn rows(&self) -> usize {
        self.imported.len() + self.rejected.len()
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Record the outcome of one row
    pub fn push(&mut self, row: usize, outcome: Result<RecordId, RecordError>) {
        match outcome {
            Ok(id) => self.imported.push(id),
            Err(error) => self.rejected.push(RowError::new(row, error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_splits_outcomes() {
        let mut report = ImportReport::new();
        report.push(1, Ok("SV1".to_string()));
        report.push(2, Err(RecordError::format("faculty", "unknown faculty 'Khoa Y'")));
        report.push(3, Ok("SV3".to_string()));

        assert_eq!(report.imported, vec!["SV1", "SV3"]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].row, 2);
        assert_eq!(report.rejected[0].field(), Some("faculty"));
        assert_eq!(report.rows(), 3);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_report_serializes_row_errors() {
        let mut report = ImportReport::new();
        report.push(2, Err(RecordError::missing_field("email")));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rejected"][0]["row"], 2);
        assert_eq!(json["rejected"][0]["kind"], "MissingField");
        assert_eq!(json["rejected"][0]["field"], "email");
        assert_eq!(
            json["rejected"][0]["reason"],
            "Missing required field 'email'"
        );
    }

    #[test]
    fn test_row_error_into_error() {
        let row_error = RowError::new(4, RecordError::not_found("SV9"));
        assert_eq!(
            row_error.into_error().to_string(),
            "Row 4: Record 'SV9' not found"
        );
    }
}
