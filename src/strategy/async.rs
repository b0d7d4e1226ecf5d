//! Asynchronous batch import strategy
//!
//! Multi-threaded implementation of the ImportStrategy trait. Rows are read
//! in batches and each batch is imported with id/email partitioning.
//!
//! # Architecture
//!
//! ```text
//! AsyncImportStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading) / tokio::fs (JSON)
//!     └── BatchProcessor (id/email partitioning + tokio tasks)
//!         └── RecordService → Arc<dyn RecordStore> (DashMap-backed)
//! ```
//!
//! # Ordering
//!
//! - Batches run one after another, so rows for the same student that span
//!   two batches are applied in file order
//! - Within a batch, partitions (rows sharing an id or email) run in parallel
//! - Outcomes are sorted by row before they reach the report, so the report
//!   lists the same rows as the sync strategy's report for the same input

use crate::core::r#async::{BatchProcessor, NumberedRow};
use crate::core::RecordService;
use crate::io::async_reader::AsyncReader;
use crate::io::files::FileFormat;
use crate::io::json_format::parse_json_rows;
use crate::strategy::{log_summary, ImportStrategy};
use crate::types::{ImportReport, ImportRow, RecordError, RowOutcome};
use std::path::Path;

/// Batch sizing for the async strategy
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Rows read and imported per batch
    pub batch_size: usize,

    /// Worker threads of the tokio runtime
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a config, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AsyncImportStrategy {
    config: BatchConfig,
}

impl AsyncImportStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    async fn import_csv(
        &self,
        input: &Path,
        processor: &BatchProcessor,
        report: &mut ImportReport,
    ) -> Result<(), RecordError> {
        let file = tokio::fs::File::open(input)
            .await
            .map_err(|e| RecordError::Io {
                message: format!("Failed to open file '{}': {}", input.display(), e),
            })?;

        // csv-async reads futures::io::AsyncRead, tokio files need the compat layer
        let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
        let mut reader = AsyncReader::new(compat_file);

        loop {
            let batch = reader.read_batch(self.config.batch_size).await;
            if batch.is_empty() {
                break;
            }

            import_batch(processor, batch, report).await;
        }

        Ok(())
    }

    async fn import_json(
        &self,
        input: &Path,
        processor: &BatchProcessor,
        report: &mut ImportReport,
    ) -> Result<(), RecordError> {
        let text = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| RecordError::Io {
                message: format!("Failed to read '{}': {}", input.display(), e),
            })?;

        let mut rows = parse_json_rows(&text)?.into_iter().peekable();
        while rows.peek().is_some() {
            let batch: Vec<_> = rows.by_ref().take(self.config.batch_size).collect();
            import_batch(processor, batch, report).await;
        }

        Ok(())
    }
}

/// Import one batch and append its outcomes to the report in row order
///
/// Rows that failed to parse skip the processor but keep their place.
async fn import_batch(
    processor: &BatchProcessor,
    batch: Vec<(usize, Result<ImportRow, RecordError>)>,
    report: &mut ImportReport,
) {
    let mut parsed: Vec<NumberedRow> = Vec::with_capacity(batch.len());
    let mut outcomes: Vec<RowOutcome> = Vec::new();

    for (row, result) in batch {
        match result {
            Ok(payload) => parsed.push((row, payload)),
            Err(e) => {
                tracing::warn!(row, error = %e, "row could not be parsed");
                outcomes.push(RowOutcome { row, result: Err(e) });
            }
        }
    }

    outcomes.extend(processor.process_batch(parsed).await);
    outcomes.sort_by_key(|outcome| outcome.row);

    for outcome in outcomes {
        report.push(outcome.row, outcome.result);
    }
}

impl ImportStrategy for AsyncImportStrategy {
    fn import(
        &self,
        input: &Path,
        format: FileFormat,
        service: &RecordService,
    ) -> Result<ImportReport, RecordError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| RecordError::Io {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        let processor = BatchProcessor::new(service.clone());

        let report = runtime.block_on(async {
            let mut report = ImportReport::new();
            match format {
                FileFormat::Csv => self.import_csv(input, &processor, &mut report).await?,
                FileFormat::Json => self.import_json(input, &processor, &mut report).await?,
            }
            Ok::<_, RecordError>(report)
        })?;

        log_summary("async", &report);
        Ok(report)
    }
}
