//! Asynchronous CSV reader with batch interface
//!
//! Reads import rows from any `futures::io::AsyncRead` in batches, for the
//! async import strategy.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - a row counter so every row keeps its 1-based position in the file,
//!   including rows that fail to parse
//!
//! # Architecture
//!
//! ```text
//! tokio::fs::File → compat → AsyncReader → Vec<(row, Result<ImportRow, RecordError>)>
//!                                 ↓
//!                          csv_format module
//!                          (CsvRow, convert_csv_row)
//! ```

use crate::io::csv_format::{convert_csv_row, CsvRow};
use crate::types::{ImportRow, RecordError};
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    row: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader over an async byte source
    ///
    /// Configured like the sync reader: fields trimmed, flexible row length.
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader, row: 0 }
    }

    /// Read up to `batch_size` rows
    ///
    /// Rows that fail to parse are returned as errors in place, so the
    /// caller can report them. An empty vector means end of input.
    pub async fn read_batch(
        &mut self,
        batch_size: usize,
    ) -> Vec<(usize, Result<ImportRow, RecordError>)> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<CsvRow>();

        while batch.len() < batch_size {
            match rows.next().await {
                Some(result) => {
                    self.row += 1;
                    batch.push((
                        self.row,
                        result.map(convert_csv_row).map_err(RecordError::from),
                    ));
                }
                None => break,
            }
        }

        batch
    }
}
