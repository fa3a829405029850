//! Dispatch Channel Module
//!
//! Bounded hand-off between the batcher and its consumers. Sends never wait:
//! a batch that does not fit is discarded whole and reported to the observer.

use super::observer::{BatchObserver, BatchSummary, DropReason};
use crate::Batch;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

/// What happened to a dispatched batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Dropped(DropReason),
}

/// Write side of the dispatch channel, owned by the batcher
///
/// Clones share the channel. It closes for the consumer once every clone
/// has been dropped or closed.
pub struct Dispatcher<T> {
    sender: Option<mpsc::Sender<Batch<T>>>,
    observer: Arc<dyn BatchObserver>,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            observer: self.observer.clone(),
        }
    }
}

impl<T> Dispatcher<T> {
    /// Create a channel of `capacity` batches
    ///
    /// # Returns
    /// The dispatcher and the only consumer handle
    pub fn channel(capacity: usize, observer: Arc<dyn BatchObserver>) -> (Self, BatchReceiver<T>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let dispatcher = Self {
            sender: Some(sender),
            observer,
        };
        (dispatcher, BatchReceiver { receiver })
    }

    /// Non-blocking send; a full or closed channel drops the whole batch
    pub fn dispatch(&self, batch: Batch<T>) -> DispatchOutcome {
        let summary = BatchSummary {
            batch_id: batch.batch_id,
            tx_count: batch.transactions.len(),
            trigger: batch.trigger,
        };

        let Some(sender) = &self.sender else {
            self.observer.batch_dropped(summary, DropReason::ChannelClosed);
            return DispatchOutcome::Dropped(DropReason::ChannelClosed);
        };

        match sender.try_send(batch) {
            Ok(()) => {
                self.observer.batch_dispatched(summary);
                DispatchOutcome::Delivered
            }
            Err(TrySendError::Full(_)) => {
                self.observer.batch_dropped(summary, DropReason::ChannelFull);
                DispatchOutcome::Dropped(DropReason::ChannelFull)
            }
            Err(TrySendError::Closed(_)) => {
                self.observer.batch_dropped(summary, DropReason::ChannelClosed);
                DispatchOutcome::Dropped(DropReason::ChannelClosed)
            }
        }
    }

    /// Release this handle's side of the channel
    ///
    /// Later dispatches through this handle report `ChannelClosed`.
    pub fn close(&mut self) {
        self.sender = None;
    }

    pub fn observer(&self) -> &Arc<dyn BatchObserver> {
        &self.observer
    }
}

/// Read-only consumer handle yielding batches in dispatch order
#[derive(Debug)]
pub struct BatchReceiver<T> {
    receiver: mpsc::Receiver<Batch<T>>,
}

impl<T> BatchReceiver<T> {
    /// Wait for the next batch
    ///
    /// Returns `None` once the batcher is gone and the channel is drained.
    pub async fn recv(&mut self) -> Option<Batch<T>> {
        self.receiver.recv().await
    }

    /// Take a batch if one is already waiting
    pub fn try_recv(&mut self) -> Option<Batch<T>> {
        match self.receiver.try_recv() {
            Ok(batch) => Some(batch),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}
