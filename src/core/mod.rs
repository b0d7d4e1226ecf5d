//! Core business logic module
//!
//! This module contains the record processing components:
//! - `status_rules` - Valid statuses and the allowed transitions between them
//! - `validator` - Field-level format checks for payloads
//! - `transition_guard` - Accepts/rejects status changes against the rules
//! - `traits` - The `RecordStore` persistence interface
//! - `record_store` - Thread-safe in-memory store
//! - `service` - Validate → guard → persist orchestration
//! - `async` - Concurrent batch import

pub mod r#async;
pub mod record_store;
pub mod service;
pub mod status_rules;
pub mod traits;
pub mod transition_guard;
pub mod validator;

pub use r#async::BatchProcessor;
pub use record_store::MemoryRecordStore;
pub use service::RecordService;
pub use status_rules::StatusRuleTable;
pub use traits::{RecordQuery, RecordStore};
pub use transition_guard::StatusTransitionGuard;
pub use validator::RecordValidator;
