//! Deposit Listener Module
//!
//! This module polls the bridge for L1 deposits and feeds them to the batcher
//! as L2 transactions.

use super::Bridge;
use crate::batch::Batcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// L1 deposit listener
///
/// Runs in the background until its token is cancelled, polling the bridge
/// at a fixed interval.
pub struct DepositListener {
    bridge: Bridge,
    batcher: Arc<Batcher>,
    poll_interval: Duration,
}

impl DepositListener {
    /// Creates a new deposit listener
    ///
    /// # Arguments
    /// * `bridge` - Bridge to poll for pending deposits
    /// * `batcher` - Batcher that receives the resulting transactions
    /// * `poll_interval` - Time between polls
    pub fn new(bridge: Bridge, batcher: Arc<Batcher>, poll_interval: Duration) -> Self {
        Self {
            bridge,
            batcher,
            poll_interval,
        }
    }

    /// Poll until `token` is cancelled or the batcher stops accepting transactions
    pub async fn run(self, token: CancellationToken) {
        info!("Deposit listener started, polling every {:?}", self.poll_interval);
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!("Deposit listener stopping: {}", e);
                        break;
                    }
                }
            }
        }

        info!("Deposit listener stopped");
    }

    /// Forward every pending deposit to the batcher
    ///
    /// # Returns
    /// How many deposits were forwarded, or an error once the batcher is stopped
    pub async fn poll_once(&self) -> anyhow::Result<usize> {
        let deposits = match self.bridge.pending_deposits() {
            Ok(deposits) => deposits,
            Err(e) => {
                warn!("Failed to fetch pending deposits: {}", e);
                return Ok(0);
            }
        };

        let mut forwarded = 0;
        for deposit in deposits {
            if let Err(e) = self.bridge.process_deposit(&deposit) {
                warn!(l1_tx_hash = ?deposit.l1_tx_hash, "Skipping deposit: {}", e);
                continue;
            }
            self.batcher.add_transaction(deposit.into_transaction()).await?;
            forwarded += 1;
        }

        if forwarded > 0 {
            debug!(forwarded, "Forwarded L1 deposits to batcher");
        }
        Ok(forwarded)
    }
}
