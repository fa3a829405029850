//! Pending Buffer Module
//!
//! This module implements the buffer of accepted-but-unbatched transactions.
//! Transactions are stored in arrival order and taken out all at once when a
//! batch is sealed.

/// Buffer of pending transactions
///
/// Plain data structure with no locking of its own; the batcher keeps it
/// behind its lock so insertion, length checks and draining all happen in
/// one critical section.
#[derive(Debug)]
pub struct PendingBuffer<T> {
    /// Transactions in insertion order
    transactions: Vec<T>,
}

impl<T> PendingBuffer<T> {
    /// Creates a new empty buffer
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    /// Append a transaction at the tail
    ///
    /// # Returns
    /// The buffer length after insertion, for the size trigger check
    pub fn push(&mut self, tx: T) -> usize {
        self.transactions.push(tx);
        self.transactions.len()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Take every pending transaction, leaving the buffer empty
    ///
    /// The returned vector owns the transactions; nothing is left behind to
    /// be batched twice.
    pub fn take_all(&mut self) -> Vec<T> {
        std::mem::take(&mut self.transactions)
    }

    /// Discard every pending transaction
    ///
    /// # Returns
    /// How many transactions were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.transactions.len();
        self.transactions.clear();
        dropped
    }
}

impl<T> Default for PendingBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
