//! Bridge Module
//!
//! This module handles L1 ↔ L2 communication:
//! - Deposits from L1 become L2 transactions
//! - Withdrawals from L2 are finalized on L1
//! - Cross-chain messages in both directions

mod bridge;
mod listener;

pub use bridge::{
    Bridge, BridgeError, CrossChainMessage, DEPOSIT_GAS_LIMIT, L1Deposit, L2Withdrawal,
    MessageOrigin,
};
pub use listener::DepositListener;
