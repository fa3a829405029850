//! Batch lifecycle events.
//!
//! The batcher reports what happened to each batch through a `BatchObserver`
//! and only calls it after the buffer lock is released.

use crate::BatchTrigger;
use tracing::{debug, info, warn};

/// Identity of a batch as seen by observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub batch_id: u64,
    pub tx_count: usize,
    pub trigger: BatchTrigger,
}

/// Why a batch never reached a consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Dispatch channel was at capacity
    ChannelFull,
    /// Every consumer handle had been dropped
    ChannelClosed,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::ChannelFull => write!(f, "batch channel full"),
            DropReason::ChannelClosed => write!(f, "batch channel closed"),
        }
    }
}

/// Sink for batcher events
pub trait BatchObserver: Send + Sync {
    fn batch_dispatched(&self, summary: BatchSummary);

    fn batch_dropped(&self, summary: BatchSummary, reason: DropReason);

    /// Pending transactions discarded because the batcher stopped without flushing
    fn pending_dropped(&self, count: usize);
}

/// Default observer: emits `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BatchObserver for TracingObserver {
    fn batch_dispatched(&self, summary: BatchSummary) {
        info!(
            batch_id = summary.batch_id,
            tx_count = summary.tx_count,
            trigger = %summary.trigger,
            "Created batch"
        );
    }

    fn batch_dropped(&self, summary: BatchSummary, reason: DropReason) {
        warn!(
            batch_id = summary.batch_id,
            tx_count = summary.tx_count,
            trigger = %summary.trigger,
            "Dropping batch: {}",
            reason
        );
    }

    fn pending_dropped(&self, count: usize) {
        if count > 0 {
            warn!(count, "Batcher stopped, dropping pending transactions");
        } else {
            debug!("Batcher stopped with empty buffer");
        }
    }
}
