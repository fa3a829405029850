//! Batch Trigger Module
//!
//! Decides when the pending buffer should be sealed:
//! - Size trigger: checked after every insertion, fires at the threshold
//! - Timeout trigger: checked on every timer tick, fires on any non-empty buffer

use crate::BatchTrigger;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Trigger policy derived from the batch configuration
#[derive(Debug, Clone, Copy)]
pub struct TriggerPolicy {
    /// Pending count that seals a batch immediately
    size_threshold: usize,
    /// Timer period
    timeout: Duration,
}

impl TriggerPolicy {
    pub fn new(size_threshold: usize, timeout: Duration) -> Self {
        Self {
            size_threshold,
            timeout,
        }
    }

    /// Evaluated right after an insertion, with the lock still held
    pub fn on_insert(&self, pending_len: usize) -> Option<BatchTrigger> {
        (pending_len >= self.size_threshold).then_some(BatchTrigger::Size)
    }

    /// Evaluated on every timer tick; an empty buffer never produces a batch
    pub fn on_tick(&self, pending_len: usize) -> Option<BatchTrigger> {
        (pending_len > 0).then_some(BatchTrigger::Timeout)
    }

    /// Timer for the timeout path
    ///
    /// The first tick lands one full period after creation. Late ticks are
    /// delayed rather than fired in a burst.
    pub fn ticker(&self) -> Interval {
        let mut ticker = interval_at(Instant::now() + self.timeout, self.timeout);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    pub fn size_threshold(&self) -> usize {
        self.size_threshold
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
