//! This crate implements the scaffold of a Layer 2 rollup node: a transaction
//! batcher feeding an execution engine, a zero-knowledge prover and an
//! L1 ↔ L2 bridge, wired together by a top-level node.

pub mod types; // Defines common data structures and types used throughout the system.
pub mod config; // Defines and loads system configuration.
pub mod pool; // Holds transactions accepted but not yet batched.
pub mod batch; // Seals pending transactions into batches and hands them to consumers.
pub mod execution; // Executes sealed batches.
pub mod zk; // Generates and verifies zero-knowledge proofs.
pub mod bridge; // Moves deposits, withdrawals and messages between L1 and L2.
pub mod node; // Top-level process holder.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use batch::Batcher;
pub use node::Node;
