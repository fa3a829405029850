//! Batch Creation Module
//!
//! This module handles batch formation and hand-off:
//! - Batcher: Accepts transactions and decides when to seal them
//! - BatchEngine: Creates sealed batches with sequential IDs
//! - Trigger: Size and timeout trigger policy
//! - Dispatch: Bounded, lossy channel to batch consumers

mod batcher;
mod dispatch;
mod engine;
mod observer;
mod trigger;

#[cfg(test)]
mod tests;

pub use batcher::{Batcher, BatcherError, BatcherState};
pub use dispatch::{BatchReceiver, DispatchOutcome, Dispatcher};
pub use engine::BatchEngine;
pub use observer::{BatchObserver, BatchSummary, DropReason, TracingObserver};
pub use trigger::TriggerPolicy;
