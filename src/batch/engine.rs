//! Batch Engine Module
//!
//! This module is responsible for creating sealed batches from pending transactions.
//! Each batch is assigned a unique sequential ID and timestamp.

use crate::{Batch, BatchTrigger, pool::PendingBuffer};
use ethers::types::H256;

/// Batch creation engine
///
/// Seals the pending buffer into batches. Maintains a sequential batch ID
/// counter, so IDs stay unique and ordered no matter how coarse the clock is.
#[derive(Debug)]
pub struct BatchEngine {
    /// Next batch ID to assign (starts at 1, increments for each batch)
    next_batch_id: u64,
}

impl BatchEngine {
    /// Creates a new batch engine
    pub fn new() -> Self {
        Self {
            next_batch_id: 1, // Batches start from ID 1
        }
    }

    /// Seal everything in `pending` into a new batch
    ///
    /// The caller must hold exclusive access to the buffer; draining and ID
    /// assignment then happen in the same critical section.
    ///
    /// # Arguments
    /// * `pending` - Buffer to drain; empty on return
    /// * `trigger` - Which trigger path asked for the batch
    ///
    /// # Returns
    /// A sealed `Batch` ready to be dispatched
    pub fn create_batch<T>(
        &mut self,
        pending: &mut PendingBuffer<T>,
        trigger: BatchTrigger,
    ) -> Batch<T> {
        let batch = Batch {
            batch_id: self.next_batch_id,
            transactions: pending.take_all(),
            state_root: H256::zero(),
            timestamp: chrono::Utc::now().timestamp_millis() as u64,
            l1_block_hash: H256::zero(),
            proof: None,
            trigger,
        };

        // Increment ID for next batch
        self.next_batch_id += 1;
        batch
    }

    /// ID the next sealed batch will carry
    pub fn next_batch_id(&self) -> u64 {
        self.next_batch_id
    }
}

impl Default for BatchEngine {
    fn default() -> Self {
        Self::new()
    }
}
