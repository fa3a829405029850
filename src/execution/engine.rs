use crate::{Receipt, ReceiptStatus, Transaction};
use ethers::types::{Address, H256};
use tracing::debug;

/// Block gas limit used until the chain config carries one
pub const DEFAULT_GAS_LIMIT: u64 = 15_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("transaction {tx_hash:?} gas limit {gas} exceeds block gas limit {limit}")]
    GasLimitExceeded { tx_hash: H256, gas: u64, limit: u64 },
}

/// L2 execution engine
///
/// Placeholder for a real EVM: produces synthetic success receipts and
/// advances the block number once per executed batch.
#[derive(Debug)]
pub struct ExecutionEngine {
    chain_id: u64,
    gas_limit: u64,
    block_number: u64,
}

impl ExecutionEngine {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            gas_limit: DEFAULT_GAS_LIMIT,
            block_number: 0,
        }
    }

    /// Execute a single transaction
    pub fn execute_transaction(&self, tx: &Transaction) -> Result<Receipt, ExecutionError> {
        let tx_hash = tx.hash();
        if tx.gas_limit > self.gas_limit {
            return Err(ExecutionError::GasLimitExceeded {
                tx_hash,
                gas: tx.gas_limit,
                limit: self.gas_limit,
            });
        }

        Ok(Receipt {
            tx_hash,
            status: ReceiptStatus::Successful,
            cumulative_gas_used: tx.gas_limit,
            gas_used: tx.gas_limit,
            block_hash: H256::zero(),
            block_number: self.block_number,
            transaction_index: 0,
            contract_address: Address::zero(),
            logs: Vec::new(),
        })
    }

    /// Execute a batch in order
    ///
    /// Any failing transaction aborts the whole batch and leaves the block
    /// number untouched.
    pub fn execute_batch(&mut self, txs: &[Transaction]) -> Result<Vec<Receipt>, ExecutionError> {
        let mut receipts = Vec::with_capacity(txs.len());

        for (index, tx) in txs.iter().enumerate() {
            let mut receipt = self.execute_transaction(tx)?;
            receipt.transaction_index = index;
            receipts.push(receipt);
        }

        debug!(
            block_number = self.block_number,
            tx_count = receipts.len(),
            "Executed batch"
        );
        self.block_number += 1;
        Ok(receipts)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn set_block_number(&mut self, number: u64) {
        self.block_number = number;
    }
}
