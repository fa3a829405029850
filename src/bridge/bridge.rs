use crate::Transaction;
use ethers::types::{Address, Bytes, H256, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gas charged to deposit transactions on L2
pub const DEPOSIT_GAS_LIMIT: u64 = 100_000;

/// A deposit from L1 to L2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1Deposit {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
    pub token_address: Address,
    pub l1_tx_hash: H256,
    pub block_number: u64,
}

impl L1Deposit {
    /// L2 transaction that credits this deposit
    ///
    /// The nonce is the L1 block number so deposits from different blocks
    /// never hash alike.
    pub fn into_transaction(self) -> Transaction {
        Transaction {
            from: self.from,
            to: Some(self.to),
            value: self.amount,
            nonce: self.block_number,
            gas_limit: DEPOSIT_GAS_LIMIT,
            gas_price: U256::zero(),
            input: Bytes::from(self.l1_tx_hash.as_bytes().to_vec()),
        }
    }
}

/// A withdrawal from L2 to L1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Withdrawal {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
    pub token_address: Address,
    pub l2_tx_hash: H256,
    pub proof: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageOrigin {
    L1,
    L2,
}

/// A message between L1 and L2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainMessage {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub nonce: u64,
    pub gas_limit: u64,
    pub origin: MessageOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("{0} amount must be non-zero")]
    ZeroAmount(&'static str),
}

/// L1 ↔ L2 bridge
///
/// Placeholder: accepts every non-empty deposit, withdrawal and message,
/// and reports nothing pending until an L1 client is wired in.
#[derive(Debug, Clone)]
pub struct Bridge {
    l1_chain_id: u64,
    l2_chain_id: u64,
}

impl Bridge {
    pub fn new(l1_chain_id: u64, l2_chain_id: u64) -> Self {
        Self {
            l1_chain_id,
            l2_chain_id,
        }
    }

    pub fn process_deposit(&self, deposit: &L1Deposit) -> Result<(), BridgeError> {
        if deposit.amount.is_zero() {
            return Err(BridgeError::ZeroAmount("deposit"));
        }
        debug!(l1_tx_hash = ?deposit.l1_tx_hash, amount = %deposit.amount, "Processing deposit");
        Ok(())
    }

    pub fn process_withdrawal(&self, withdrawal: &L2Withdrawal) -> Result<(), BridgeError> {
        if withdrawal.amount.is_zero() {
            return Err(BridgeError::ZeroAmount("withdrawal"));
        }
        debug!(
            l2_tx_hash = ?withdrawal.l2_tx_hash,
            amount = %withdrawal.amount,
            "Processing withdrawal"
        );
        Ok(())
    }

    pub fn send_cross_chain_message(&self, msg: &CrossChainMessage) -> Result<(), BridgeError> {
        let destination = match msg.origin {
            MessageOrigin::L1 => self.l2_chain_id,
            MessageOrigin::L2 => self.l1_chain_id,
        };
        debug!(nonce = msg.nonce, destination, "Sending cross-chain message");
        Ok(())
    }

    /// Deposits observed on L1 that have not been credited yet
    pub fn pending_deposits(&self) -> Result<Vec<L1Deposit>, BridgeError> {
        Ok(Vec::new())
    }

    /// Withdrawals waiting to be finalized on L1
    pub fn pending_withdrawals(&self) -> Result<Vec<L2Withdrawal>, BridgeError> {
        Ok(Vec::new())
    }

    pub fn l1_chain_id(&self) -> u64 {
        self.l1_chain_id
    }

    pub fn l2_chain_id(&self) -> u64 {
        self.l2_chain_id
    }
}
