//! Batch run notifications
//!
//! The pipeline reports progress through a [`BatchObserver`] and knows nothing
//! about who is listening. [`ChannelObserver`] bridges the blocking worker to an
//! async consumer such as a UI task or the CLI progress printer.

use super::statistics::BatchStatistics;
use crate::domain::errors::BatchError;
use tokio::sync::mpsc;

/// Receives notifications from a running batch
///
/// Callbacks are invoked from the worker thread, in order, and must not block
/// for long.
pub trait BatchObserver: Send + Sync {
    /// Percentage of files attempted so far (0..=100)
    fn on_progress(&self, percent: u8);

    /// Status line naming the file just processed
    fn on_status(&self, status: &str);

    /// Terminal result of the run; called exactly once
    fn on_finished(&self, result: &Result<BatchStatistics, BatchError>);
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_progress(&self, _percent: u8) {}

    fn on_status(&self, _status: &str) {}

    fn on_finished(&self, _result: &Result<BatchStatistics, BatchError>) {}
}

/// One notification, as delivered by [`ChannelObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Progress(u8),
    Status(String),
    Finished(Result<BatchStatistics, BatchError>),
}

/// Forwards notifications over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<BatchEvent>,
}

impl ChannelObserver {
    /// Creates the observer and the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: BatchEvent) {
        // A dropped receiver only means nobody is watching any more
        if self.tx.send(event).is_err() {
            tracing::trace!("Batch event receiver dropped");
        }
    }
}

impl BatchObserver for ChannelObserver {
    fn on_progress(&self, percent: u8) {
        self.send(BatchEvent::Progress(percent));
    }

    fn on_status(&self, status: &str) {
        self.send(BatchEvent::Status(status.to_string()));
    }

    fn on_finished(&self, result: &Result<BatchStatistics, BatchError>) {
        self.send(BatchEvent::Finished(result.clone()));
    }
}
