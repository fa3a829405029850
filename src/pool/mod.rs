//! Transaction Pool Module
//!
//! This module holds transactions that have been accepted by the node but
//! not yet sealed into a batch.

mod pending;

pub use pending::PendingBuffer;
