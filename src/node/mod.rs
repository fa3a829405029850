//! Node Module
//!
//! The top-level process holder. Owns the configuration and wires the
//! batcher, execution engine, prover and bridge together.

mod node;
pub use node::Node;
