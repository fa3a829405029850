//! Execution Module
//!
//! This module executes sealed batches and produces receipts.
//! The engine is a stub: every transaction succeeds and burns its gas limit.

mod engine;
pub use engine::{ExecutionEngine, ExecutionError, DEFAULT_GAS_LIMIT};
