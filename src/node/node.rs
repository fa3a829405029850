use crate::{
    Batch, StateCommitment, Transaction,
    batch::{BatchReceiver, Batcher},
    bridge::{Bridge, DepositListener},
    config::Config,
    execution::ExecutionEngine,
    zk::Prover,
};
use anyhow::{Context, bail};
use ethers::types::H256;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

/// Components that only exist while the node is running
struct Running {
    batcher: Arc<Batcher>,
    token: CancellationToken,
    tracker: TaskTracker,
}

/// Layer 2 node
///
/// `start` brings up the batcher, a consumer that executes (and optionally
/// proves) every sealed batch, and the L1 deposit listener. `stop` shuts
/// them down in that order.
pub struct Node {
    config: Config,
    running: Option<Running>,
    latest_commitment: Arc<RwLock<Option<StateCommitment>>>,
}

impl Node {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            running: None,
            latest_commitment: Arc::new(RwLock::new(None)),
        }
    }

    /// Bring the node up
    ///
    /// Cancelling `token` shuts every component down; `stop` should still be
    /// called afterwards to wait for them.
    pub async fn start(&mut self, token: &CancellationToken) -> anyhow::Result<()> {
        if self.running.is_some() {
            bail!("node already started");
        }

        if self.config.node.dev_mode {
            info!("Starting Layer 2 node in DEV mode: using ephemeral config");
        } else {
            info!("Starting Layer 2 node");
        }

        if !self.config.node.l2_mode {
            warn!("L2 mode disabled, no Layer 2 components started");
            return Ok(());
        }

        info!(
            chain_id = self.config.l2.chain_id,
            l1_chain_id = self.config.l2.l1_chain_id,
            enable_zk = self.config.l2.enable_zk,
            "Initializing Layer 2 components: execution engine, batcher, prover, bridge"
        );

        let token = token.child_token();
        let tracker = TaskTracker::new();

        let batcher: Arc<Batcher> =
            Arc::new(Batcher::new(&self.config.batch).context("invalid batch config")?);
        let batches = batcher
            .batches()
            .context("batch consumer handle already taken")?;
        batcher.start(&token)?;

        let consumer = BatchConsumer {
            engine: ExecutionEngine::new(self.config.l2.chain_id),
            prover: self.config.l2.enable_zk.then(Prover::new),
            latest_commitment: self.latest_commitment.clone(),
        };
        tracker.spawn(consumer.run(batches));

        let listener = DepositListener::new(
            Bridge::new(self.config.l2.l1_chain_id, self.config.l2.chain_id),
            batcher.clone(),
            Duration::from_millis(self.config.l2.deposit_poll_interval_ms),
        );
        tracker.spawn(listener.run(token.clone()));
        tracker.close();

        self.running = Some(Running {
            batcher,
            token,
            tracker,
        });
        info!("Layer 2 node started");
        Ok(())
    }

    /// Gracefully shut the node down
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        info!("Stopping Layer 2 node");
        let Some(running) = self.running.take() else {
            if self.config.node.l2_mode {
                bail!("node is not running");
            }
            return Ok(());
        };

        // Stop intake first so a final flushed batch still reaches the consumer
        let result = running.batcher.stop().await;
        running.token.cancel();
        running.tracker.wait().await;

        result.context("failed to stop batcher")?;
        info!("Layer 2 node stopped");
        Ok(())
    }

    /// Hand a validated transaction to the batcher
    pub async fn submit_transaction(&self, tx: Transaction) -> anyhow::Result<()> {
        let Some(running) = &self.running else {
            bail!("node is not running");
        };
        running.batcher.add_transaction(tx).await?;
        Ok(())
    }

    /// Transactions waiting to be batched, zero when not running
    pub async fn pending_count(&self) -> usize {
        match &self.running {
            Some(running) => running.batcher.pending_count().await,
            None => 0,
        }
    }

    /// Commitment produced for the most recently executed batch
    pub async fn latest_commitment(&self) -> Option<StateCommitment> {
        self.latest_commitment.read().await.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Executes sealed batches as they arrive
struct BatchConsumer {
    engine: ExecutionEngine,
    prover: Option<Prover>,
    latest_commitment: Arc<RwLock<Option<StateCommitment>>>,
}

impl BatchConsumer {
    /// Runs until the batcher tears down and the channel is drained
    async fn run(mut self, mut batches: BatchReceiver<Transaction>) {
        while let Some(batch) = batches.recv().await {
            self.process(batch).await;
        }
        info!("Batch consumer stopped");
    }

    async fn process(&mut self, batch: Batch) {
        let block_number = self.engine.block_number();
        let receipts = match self.engine.execute_batch(&batch.transactions) {
            Ok(receipts) => receipts,
            Err(e) => {
                error!(batch_id = batch.batch_id, "Batch execution failed: {}", e);
                return;
            }
        };

        let proof = match &self.prover {
            Some(prover) => match prover.prove_batch(&batch) {
                Ok(proof) => Some(proof.data),
                Err(e) => {
                    warn!(batch_id = batch.batch_id, "Batch proof failed: {}", e);
                    None
                }
            },
            None => None,
        };

        info!(
            batch_id = batch.batch_id,
            block_number,
            receipts = receipts.len(),
            proven = proof.is_some(),
            "Executed batch"
        );

        *self.latest_commitment.write().await = Some(StateCommitment {
            root: H256::zero(),
            block_number,
            batch_id: batch.batch_id,
            proof,
            timestamp: batch.timestamp,
        });
    }
}
