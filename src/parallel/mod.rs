//! Parallel processing module for linesift
//!
//! A single distributor feeds a bounded work channel, a fixed pool of
//! workers filters lines and publishes to a bounded result channel, and a
//! single sink counts results or restores input order.
//!
//! # Module Structure
//!
//! - `types`: Channel messages and configuration
//! - `distributor`: Line source to work channel, plus termination markers
//! - `worker`: Worker thread evaluating the predicate
//! - `sink`: Result sink thread, count and ordered modes
//! - `processor`: Main ParallelProcessor orchestration

mod distributor;
mod processor;
mod sink;
mod types;
mod worker;

// Re-export public types
pub use processor::ParallelProcessor;
pub use types::{ParallelConfig, DEFAULT_BUFFER_SIZE};
