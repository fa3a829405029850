use ethers::types::{Address, Bytes, H256, U256};
use ethers::utils::keccak256;
use serde::{Deserialize, Serialize};

/// L2 transaction handed to the batcher by the intake layer
///
/// The batcher treats this as an opaque value; only the execution engine
/// and the bridge look inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Address,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub value: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: U256,
    pub input: Bytes,
}

impl Transaction {
    /// Compute the keccak256 hash of the transaction fields
    pub fn hash(&self) -> H256 {
        let mut data = Vec::new();
        data.extend_from_slice(self.from.as_bytes());
        if let Some(to) = &self.to {
            data.extend_from_slice(to.as_bytes());
        }

        // Convert U256 to bytes (32 bytes)
        let mut value_bytes = [0u8; 32];
        self.value.to_big_endian(&mut value_bytes);
        data.extend_from_slice(&value_bytes);

        data.extend_from_slice(&self.nonce.to_be_bytes());
        data.extend_from_slice(&self.gas_limit.to_be_bytes());

        let mut gas_price_bytes = [0u8; 32];
        self.gas_price.to_big_endian(&mut gas_price_bytes);
        data.extend_from_slice(&gas_price_bytes);

        data.extend_from_slice(&self.input);

        H256::from_slice(&keccak256(data))
    }
}

/// Which trigger path sealed a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchTrigger {
    /// Pending buffer reached the configured size threshold
    Size,
    /// Timer fired with a non-empty buffer
    Timeout,
    /// Final flush performed while the batcher was stopping
    Shutdown,
}

impl std::fmt::Display for BatchTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchTrigger::Size => write!(f, "size"),
            BatchTrigger::Timeout => write!(f, "timeout"),
            BatchTrigger::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Sealed batch ready for execution and proving
///
/// Constructed once by the batch engine and never mutated afterwards. The
/// state root, L1 block hash and proof are left unset here; they belong to
/// the execution and proof collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch<T = Transaction> {
    pub batch_id: u64,
    pub transactions: Vec<T>,
    pub state_root: H256,
    /// Milliseconds since the Unix epoch at assembly time
    pub timestamp: u64,
    pub l1_block_hash: H256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Bytes>,
    pub trigger: BatchTrigger,
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Outcome of executing a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Failed,
    Successful,
}

/// Execution receipt produced by the execution engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: H256,
    pub status: ReceiptStatus,
    pub cumulative_gas_used: u64,
    pub gas_used: u64,
    pub block_hash: H256,
    pub block_number: u64,
    pub transaction_index: usize,
    pub contract_address: Address,
    pub logs: Vec<Bytes>,
}

/// Commitment to the L2 state after a batch has been executed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateCommitment {
    pub root: H256,
    pub block_number: u64,
    pub batch_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Bytes>,
    pub timestamp: u64,
}
