//! Batch anonymization of a directory tree
//!
//! This module discovers record files under an input root, anonymizes them one
//! by one, and mirrors the results under an output root.

pub mod discovery;
pub mod observer;
pub mod pipeline;
pub mod statistics;

pub use discovery::discover_records;
pub use observer::{BatchEvent, BatchObserver, ChannelObserver, NoopObserver};
pub use pipeline::{progress_percent, BatchJob, BatchPipeline, BatchState};
pub use statistics::{BatchStatistics, FileError, SUMMARY_ERROR_LIMIT};
