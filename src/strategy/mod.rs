//! Import strategy module
//!
//! This module defines the Strategy pattern for complete bulk import
//! pipelines, from reading the input file to collecting the import report.
//! Different implementations (synchronous streaming, asynchronous batches)
//! can be selected at runtime and produce the same report for the same
//! input.
//!
//! Every strategy funnels rows through [`import_rows`] or the batch
//! processor, which both import a row with the same service call, so the
//! validation, transition and upsert rules never differ between them.

use crate::cli::StrategyType;
use crate::core::RecordService;
use crate::io::files::{parse_rows, FileFormat};
use crate::types::{ImportReport, ImportRow, RecordError};
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncImportStrategy, BatchConfig};
pub use sync::SyncImportStrategy;

/// Bulk import pipeline
pub trait ImportStrategy: Send + Sync {
    /// Import every row of `input` into the service's store
    ///
    /// Rejected rows are collected in the report; they are not errors.
    ///
    /// # Errors
    ///
    /// Returns an error only when the import cannot run at all:
    /// - The input file cannot be opened or read
    /// - A JSON input is not a JSON array
    fn import(
        &self,
        input: &Path,
        format: FileFormat,
        service: &RecordService,
    ) -> Result<ImportReport, RecordError>;
}

/// Create an import strategy based on the specified strategy type
///
/// `config` is only used by the async strategy; `None` means defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ImportStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncImportStrategy),
        StrategyType::Async => Box::new(AsyncImportStrategy::new(config.unwrap_or_default())),
    }
}

/// Import numbered rows in order, collecting every outcome
///
/// Rows that already failed to parse are reported as they are; the rest go
/// through the service's upsert.
pub fn import_rows<I>(service: &RecordService, rows: I) -> ImportReport
where
    I: IntoIterator<Item = (usize, Result<ImportRow, RecordError>)>,
{
    let mut report = ImportReport::new();

    for (row, parsed) in rows {
        let outcome = match parsed {
            Ok(payload) => service.import_row(row, &payload).result,
            Err(e) => {
                tracing::warn!(row, error = %e, "row could not be parsed");
                Err(e)
            }
        };
        report.push(row, outcome);
    }

    report
}

/// Import the full text of a CSV or JSON file
pub fn import_text(
    service: &RecordService,
    text: &str,
    format: FileFormat,
) -> Result<ImportReport, RecordError> {
    let rows = parse_rows(text, format)?;
    Ok(import_rows(service, rows))
}

fn log_summary(strategy: &str, report: &ImportReport) {
    tracing::info!(
        strategy,
        rows = report.rows(),
        imported = report.imported.len(),
        rejected = report.rejected.len(),
        "import finished"
    );
}
