//! Batch processing with id-based partitioning for async imports
//!
//! This module provides the `BatchProcessor` struct, which imports a batch of
//! rows concurrently while keeping rows that target the same record in file
//! order.
//!
//! # Design
//!
//! Rows are partitioned by their `id` and `email` fields, plus the stored
//! email of the record an `id` already names. Each partition runs
//! on its own tokio task and processes its rows sequentially, so an earlier
//! row for a student is always applied before a later one (a later row can
//! depend on the status the earlier row set), and of two rows claiming the
//! same email the earlier one wins. Rows without an `id` share a single
//! partition; they fail validation anyway.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── RecordService  (validator + transition guard + Arc<dyn RecordStore>)
//! ```

use std::collections::HashMap;

use crate::core::service::RecordService;
use crate::types::{ImportRow, RecordError, RowOutcome};

/// A row together with its 1-based position in the import file
pub type NumberedRow = (usize, ImportRow);

/// Batch processor with id-based partitioning
#[derive(Clone)]
pub struct BatchProcessor {
    service: RecordService,
}

impl BatchProcessor {
    pub fn new(service: RecordService) -> Self {
        Self { service }
    }

    /// Partition a batch of rows into groups that must run sequentially
    ///
    /// Two rows land in the same partition when they share a record id or an
    /// email address (compared case-insensitively), directly or through
    /// other rows. A row for a stored record also claims that record's
    /// current email, since moving the record off it frees the address for
    /// another row. This keeps the outcome of an email collision independent
    /// of task scheduling.
    ///
    /// # Guarantees
    ///
    /// - Each row appears in exactly one partition
    /// - Rows in a partition keep their original order
    /// - Partitions are ordered by their first row
    pub fn partition_rows(&self, batch: Vec<NumberedRow>) -> Vec<Vec<NumberedRow>> {
        let mut parent: Vec<usize> = (0..batch.len()).collect();
        let mut owners: HashMap<String, usize> = HashMap::new();

        for (index, (_, payload)) in batch.iter().enumerate() {
            for key in self.partition_keys(payload) {
                let existing = owners.get(&key).copied();
                match existing {
                    Some(owner) => {
                        let (a, b) = (find_root(&mut parent, index), find_root(&mut parent, owner));
                        parent[a.max(b)] = a.min(b);
                    }
                    None => {
                        owners.insert(key, index);
                    }
                }
            }
        }

        let mut slots: HashMap<usize, usize> = HashMap::new();
        let mut partitions: Vec<Vec<NumberedRow>> = Vec::new();
        for (index, row) in batch.into_iter().enumerate() {
            let root = find_root(&mut parent, index);
            let slot = *slots.entry(root).or_insert_with(|| {
                partitions.push(Vec::new());
                partitions.len() - 1
            });
            partitions[slot].push(row);
        }

        partitions
    }

    /// Import one partition's rows sequentially
    pub async fn process_partition(&self, rows: Vec<NumberedRow>) -> Vec<RowOutcome> {
        rows.iter()
            .map(|(row, payload)| self.service.import_row(*row, payload))
            .collect()
    }

    /// Import a batch with one tokio task per partition
    ///
    /// Outcomes are returned sorted by row index, so the caller sees the
    /// same order a sequential import would produce.
    pub async fn process_batch(&self, batch: Vec<NumberedRow>) -> Vec<RowOutcome> {
        let partitions = self.partition_rows(batch);

        let mut tasks = Vec::with_capacity(partitions.len());
        for rows in partitions {
            let processor = self.clone();
            let rows_in_task: Vec<usize> = rows.iter().map(|(row, _)| *row).collect();
            let task = tokio::spawn(async move { processor.process_partition(rows).await });
            tasks.push((rows_in_task, task));
        }

        let mut outcomes = Vec::new();
        for (rows, task) in tasks {
            match task.await {
                Ok(partition_outcomes) => outcomes.extend(partition_outcomes),
                Err(e) => {
                    tracing::error!(error = %e, "import task panicked");
                    outcomes.extend(rows.into_iter().map(|row| RowOutcome {
                        row,
                        result: Err(RecordError::Io {
                            message: format!("import task failed: {}", e),
                        }),
                    }));
                }
            }
        }

        outcomes.sort_by_key(|outcome| outcome.row);
        outcomes
    }

    /// Keys that force rows into the same partition
    ///
    /// A missing id maps to the empty id, so id-less rows share a partition.
    fn partition_keys(&self, payload: &ImportRow) -> Vec<String> {
        let id = payload.get("id").map(str::trim).unwrap_or_default();
        let mut keys = vec![format!("id:{}", id)];

        if let Some(email) = payload.get("email").map(str::trim).filter(|e| !e.is_empty()) {
            keys.push(email_key(email));
        }
        if let Some(stored) = self.service.store().get(id) {
            keys.push(email_key(&stored.email));
        }

        keys
    }
}

fn email_key(email: &str) -> String {
    format!("email:{}", email.trim().to_lowercase())
}


fn find_root(parent: &mut [usize], mut index: usize) -> usize {
    while parent[index] != index {
        parent[index] = parent[parent[index]];
        index = parent[index];
    }
    index
}
