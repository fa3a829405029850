//! Zero-Knowledge Proof Module
//!
//! Proof generation and verification for batches and private transactions.
//! Both sides are placeholders until a proving backend is integrated.

mod prover;
pub use prover::{
    Circuit, PLACEHOLDER_PROOF, PrivateTransaction, Proof, ProofKind, Prover, ProverError,
    Verifier, Witness,
};
