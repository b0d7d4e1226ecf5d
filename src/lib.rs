//! Student Records Library
//! # Overview
//!
//! This library provides the validated core of a student-records system:
//! field validation, a status transition state machine, a record store and
//! CSV/JSON bulk import and export with both a sync and an async strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Records, closed value sets, payloads, errors, import reports
//! - [`cli`] - CLI arguments parsing and the import/export run
//! - [`core`] - Business logic components:
//!   - [`core::status_rules`] - Valid statuses and allowed transitions
//!   - [`core::validator`] - Field-level format checks
//!   - [`core::transition_guard`] - Accepts or rejects status changes
//!   - [`core::record_store`] - Thread-safe in-memory record store
//!   - [`core::service`] - Validate, guard and persist orchestration
//! - [`io`] - CSV/JSON parsing, export and file access
//! - [`strategy`] - Pluggable bulk import pipelines
//!
//! # Student Statuses
//!
//! - **Đang học** (studying) → Bảo lưu, Đình chỉ, Đã tốt nghiệp, Đã thôi học
//! - **Bảo lưu** (deferred) → Đang học, Đã thôi học
//! - **Đình chỉ** (suspended) → Đang học, Đã thôi học
//! - **Đã tốt nghiệp** (graduated) and **Đã thôi học** (dropped out) are terminal
//!
//! Keeping the current status is always allowed.
//!
//! # Bulk Import
//!
//! Each row is validated and upserted on its own. A bad row becomes an entry
//! in the report's `rejected` list and the import continues.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{MemoryRecordStore, RecordQuery, RecordService, RecordStore};
pub use io::{export_records, FileFormat};
pub use strategy::{create_strategy, import_rows, import_text, ImportStrategy};
pub use types::{
    ErrorKind, Faculty, Gender, ImportReport, ImportRow, Record, RecordError, RecordId,
    RecordPayload, RowError, RowOutcome, StudentStatus,
};
