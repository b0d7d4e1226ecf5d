//! Asynchronous import processing
//!
//! The record store is already thread-safe (DashMap), so the async side only
//! needs the batch processor that fans rows out to tokio tasks:
//!
//! - **BatchProcessor**: partitions a batch by record id and email and
//!   imports the partitions concurrently, keeping per-record row order

pub mod batch_processor;

pub use batch_processor::{BatchProcessor, NumberedRow};
