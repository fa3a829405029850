use crate::Batch;
use ethers::types::{Bytes, H256};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Proof bytes returned until a real backend is wired in
pub const PLACEHOLDER_PROOF: &[u8] = b"placeholder_proof";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofKind {
    Snark,
    Stark,
}

/// A zero-knowledge proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub data: Bytes,
    #[serde(rename = "publicInputs")]
    pub public_inputs: Vec<Bytes>,
    #[serde(rename = "type")]
    pub kind: ProofKind,
}

/// A confidential transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateTransaction {
    pub encrypted_data: Bytes,
    pub proof: Option<Proof>,
    pub nullifier: Bytes,
    pub commitment: Bytes,
}

/// Input to a circuit
///
/// Each variant names what the circuit is proving; `Raw` carries payloads
/// from circuits this crate does not model, tagged with their kind.
#[derive(Debug, Clone)]
pub enum Witness {
    Transaction(PrivateTransaction),
    Batch { batch_id: u64, tx_hashes: Vec<H256> },
    Raw { kind: String, data: Bytes },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProverError {
    #[error("witness of kind `{0}` carries no data")]
    EmptyWitness(String),
}

/// A circuit that can prove and verify statements about a witness
pub trait Circuit {
    fn generate_proof(&self, witness: &Witness) -> Result<Proof, ProverError>;

    fn verify_proof(&self, proof: &Proof) -> Result<bool, ProverError>;
}

/// Proof generator
#[derive(Debug, Default, Clone)]
pub struct Prover;

impl Prover {
    pub fn new() -> Self {
        Self
    }

    /// Prove a private transaction; public inputs are its nullifier and commitment
    pub fn generate_transaction_proof(
        &self,
        tx: &PrivateTransaction,
    ) -> Result<Proof, ProverError> {
        Ok(placeholder(vec![tx.nullifier.clone(), tx.commitment.clone()]))
    }

    pub fn verify_transaction_proof(&self, proof: &Proof) -> Result<bool, ProverError> {
        Ok(!proof.data.is_empty())
    }

    /// Prove a sealed batch; the public input is its ID
    pub fn prove_batch<T>(&self, batch: &Batch<T>) -> Result<Proof, ProverError> {
        debug!(batch_id = batch.batch_id, "Generating batch proof");
        Ok(placeholder(vec![Bytes::from(batch.batch_id.to_be_bytes().to_vec())]))
    }
}

impl Circuit for Prover {
    fn generate_proof(&self, witness: &Witness) -> Result<Proof, ProverError> {
        match witness {
            Witness::Transaction(tx) => self.generate_transaction_proof(tx),
            Witness::Batch { batch_id, tx_hashes } => {
                let mut inputs = vec![Bytes::from(batch_id.to_be_bytes().to_vec())];
                inputs.extend(tx_hashes.iter().map(|hash| Bytes::from(hash.as_bytes().to_vec())));
                Ok(placeholder(inputs))
            }
            Witness::Raw { kind, data } if data.is_empty() => {
                Err(ProverError::EmptyWitness(kind.clone()))
            }
            Witness::Raw { data, .. } => Ok(placeholder(vec![data.clone()])),
        }
    }

    fn verify_proof(&self, proof: &Proof) -> Result<bool, ProverError> {
        self.verify_transaction_proof(proof)
    }
}

/// Proof verifier
#[derive(Debug, Default, Clone)]
pub struct Verifier;

impl Verifier {
    pub fn new() -> Self {
        Self
    }

    pub fn verify(&self, proof: &Proof) -> Result<bool, ProverError> {
        Ok(!proof.data.is_empty())
    }
}

fn placeholder(public_inputs: Vec<Bytes>) -> Proof {
    Proof {
        data: Bytes::from(PLACEHOLDER_PROOF.to_vec()),
        public_inputs,
        kind: ProofKind::Snark,
    }
}
