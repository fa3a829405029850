//! Batcher Module
//!
//! This module implements the batch-formation engine that connects the
//! pending buffer, trigger policy, batch engine and dispatch channel.
//!
//! # Architecture Flow
//! 1. `add_transaction` appends to the pending buffer under the write lock
//! 2. If the buffer reached the size threshold, it is sealed in the same critical section
//! 3. Independently, a background timer seals any non-empty buffer on every tick
//! 4. Sealed batches are sent after the lock is released (dropped if the channel is full)
//! 5. `stop` (or cancelling the start token) ends the timer, drops or flushes what is
//!    pending, and closes the channel once the last in-flight batch has been sent

use crate::{
    Batch, BatchTrigger, Transaction,
    batch::{
        BatchEngine,
        dispatch::{BatchReceiver, Dispatcher},
        observer::{BatchObserver, TracingObserver},
        trigger::TriggerPolicy,
    },
    config::{BatchConfig, ConfigError},
    pool::PendingBuffer,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Lifecycle state of a batcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatcherState {
    /// Constructed, timer not started
    Idle,
    /// Timer running
    Running,
    /// `stop` in progress
    Stopping,
    /// Torn down; terminal
    Stopped,
}

/// Errors returned by the batcher
///
/// Transactions are never rejected for their content; these only report
/// lifecycle misuse.
#[derive(Debug, thiserror::Error)]
pub enum BatcherError {
    #[error("batcher has been stopped")]
    Stopped,
    #[error("cannot {operation} batcher while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: BatcherState,
    },
    #[error("batch timer task failed: {0}")]
    TimerTask(#[from] tokio::task::JoinError),
}

/// State guarded by the batcher lock
struct BatchCore<T> {
    pending: PendingBuffer<T>,
    engine: BatchEngine,
    dispatcher: Dispatcher<T>,
    /// Set once during teardown; later insertions are refused
    closed: bool,
}

impl<T> BatchCore<T> {
    /// Seal the buffer into a batch
    ///
    /// The returned dispatcher holds the channel open until the batch has
    /// been sent, even if teardown closes it in between.
    fn seal(&mut self, trigger: BatchTrigger) -> (Batch<T>, Dispatcher<T>) {
        let batch = self.engine.create_batch(&mut self.pending, trigger);
        (batch, self.dispatcher.clone())
    }
}

/// Everything the timer task shares with the intake path
struct Shared<T> {
    core: RwLock<BatchCore<T>>,
    policy: TriggerPolicy,
    flush_on_stop: bool,
}

impl<T: Send + Sync + 'static> Shared<T> {
    /// Timer tick: seal the buffer if it holds anything
    async fn seal_on_tick(&self) {
        let (batch, dispatcher) = {
            let mut core = self.core.write().await;
            match self.policy.on_tick(core.pending.len()) {
                Some(trigger) => core.seal(trigger),
                None => return,
            }
        };

        debug!(batch_id = batch.batch_id, "Batch timeout triggered");
        dispatcher.dispatch(batch);
    }

    /// Close the buffer, flush or drop what is left in it, and release the channel
    async fn teardown(&self) {
        let (sealed, observer, dropped) = {
            let mut core = self.core.write().await;
            if core.closed {
                return;
            }
            core.closed = true;
            let sealed = (self.flush_on_stop && !core.pending.is_empty())
                .then(|| core.seal(BatchTrigger::Shutdown));
            let dropped = core.pending.clear();
            let observer = core.dispatcher.observer().clone();
            core.dispatcher.close();
            (sealed, observer, dropped)
        };

        match sealed {
            Some((batch, dispatcher)) => {
                dispatcher.dispatch(batch);
            }
            None => observer.pending_dropped(dropped),
        }
    }

    /// Background loop driving the timeout trigger
    async fn run_timer(self: Arc<Self>, token: CancellationToken) {
        let mut ticker = self.policy.ticker();

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => self.seal_on_tick().await,
            }
        }

        self.teardown().await;
        info!("Batch timer stopped");
    }
}

struct Lifecycle {
    state: BatcherState,
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

impl Lifecycle {
    /// Record a teardown caused by cancelling the start token
    ///
    /// The handle is kept so that one `stop` can still join the task.
    fn sync(&mut self) {
        let finished = self.handle.as_ref().is_some_and(JoinHandle::is_finished);
        if self.state == BatcherState::Running && finished {
            self.state = BatcherState::Stopped;
        }
    }
}

/// Transaction batcher
///
/// Accepts transactions from any number of concurrent callers and emits
/// bounded batches, sealed either when the buffer reaches the size threshold
/// or when the timeout elapses with transactions pending.
///
/// Sealed batches go to a bounded channel. When it is full the batch is
/// dropped and a warning is emitted; intake never waits for consumers.
pub struct Batcher<T = Transaction> {
    shared: Arc<Shared<T>>,
    /// Consumer handle, taken once by `batches`
    receiver: Mutex<Option<BatchReceiver<T>>>,
    lifecycle: Mutex<Lifecycle>,
}

impl<T: Send + Sync + 'static> Batcher<T> {
    /// Creates a new batcher that reports through `tracing`
    ///
    /// # Arguments
    /// * `config` - Batch configuration (threshold, timeout, channel capacity, flush policy)
    pub fn new(config: &BatchConfig) -> Result<Self, ConfigError> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    /// Creates a new batcher reporting to `observer`
    pub fn with_observer(
        config: &BatchConfig,
        observer: Arc<dyn BatchObserver>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (dispatcher, receiver) = Dispatcher::channel(config.channel_capacity, observer);
        let shared = Shared {
            core: RwLock::new(BatchCore {
                pending: PendingBuffer::new(),
                engine: BatchEngine::new(),
                dispatcher,
                closed: false,
            }),
            policy: TriggerPolicy::new(config.max_batch_size, config.timeout()),
            flush_on_stop: config.flush_on_stop,
        };

        Ok(Self {
            shared: Arc::new(shared),
            receiver: Mutex::new(Some(receiver)),
            lifecycle: Mutex::new(Lifecycle {
                state: BatcherState::Idle,
                token: None,
                handle: None,
            }),
        })
    }

    /// Start the timeout trigger
    ///
    /// Spawns the timer task under a child of `token`. Cancelling `token`
    /// tears the batcher down exactly like `stop`.
    ///
    /// Must be called from within a Tokio runtime, once, on an idle batcher.
    pub fn start(&self, token: &CancellationToken) -> Result<(), BatcherError> {
        let mut lifecycle = self.lifecycle();
        lifecycle.sync();
        if lifecycle.state != BatcherState::Idle {
            return Err(BatcherError::InvalidState {
                operation: "start",
                state: lifecycle.state,
            });
        }

        info!(
            "Batcher starting: max_batch_size={}, timeout={:?}",
            self.shared.policy.size_threshold(),
            self.shared.policy.timeout()
        );

        let token = token.child_token();
        let handle = tokio::spawn(self.shared.clone().run_timer(token.clone()));

        lifecycle.state = BatcherState::Running;
        lifecycle.token = Some(token);
        lifecycle.handle = Some(handle);
        Ok(())
    }

    /// Stop the timer and wait for it to exit
    ///
    /// Pending transactions are dropped unless `flush_on_stop` is set, in
    /// which case they are sealed into one final batch. Afterwards the
    /// batcher refuses new transactions and the consumer handle drains to
    /// `None`.
    ///
    /// After the start token was cancelled, the first `stop` joins the
    /// already exited timer task; later calls are rejected.
    pub async fn stop(&self) -> Result<(), BatcherError> {
        let (token, handle) = {
            let mut lifecycle = self.lifecycle();
            lifecycle.sync();
            let joinable = match lifecycle.state {
                BatcherState::Running => true,
                BatcherState::Stopped => lifecycle.handle.is_some(),
                BatcherState::Idle | BatcherState::Stopping => false,
            };
            if !joinable {
                return Err(BatcherError::InvalidState {
                    operation: "stop",
                    state: lifecycle.state,
                });
            }
            if lifecycle.state == BatcherState::Running {
                lifecycle.state = BatcherState::Stopping;
            }
            (lifecycle.token.take(), lifecycle.handle.take())
        };

        info!("Batcher stopping");
        if let Some(token) = token {
            token.cancel();
        }
        let result = match handle {
            Some(handle) => handle.await.map_err(BatcherError::from),
            None => Ok(()),
        };
        if result.is_err() {
            // Timer task died before its own teardown
            self.shared.teardown().await;
        }

        self.lifecycle().state = BatcherState::Stopped;
        result
    }

    /// Add a transaction to the pending buffer
    ///
    /// Seals and dispatches a batch before returning if the buffer reached
    /// the size threshold. The caller's task pays for that assembly.
    ///
    /// # Returns
    /// `Err(BatcherError::Stopped)` only after the batcher was torn down
    pub async fn add_transaction(&self, tx: T) -> Result<(), BatcherError> {
        let sealed = {
            let mut core = self.shared.core.write().await;
            if core.closed {
                return Err(BatcherError::Stopped);
            }
            let len = core.pending.push(tx);
            self.shared.policy.on_insert(len).map(|trigger| core.seal(trigger))
        };

        if let Some((batch, dispatcher)) = sealed {
            dispatcher.dispatch(batch);
        }
        Ok(())
    }

    /// Number of transactions waiting to be batched
    ///
    /// Observability only; the value may be stale by the time it is read.
    pub async fn pending_count(&self) -> usize {
        self.shared.core.read().await.pending.len()
    }

    /// Consumer handle for sealed batches
    ///
    /// Returns `Some` on the first call and `None` afterwards.
    pub fn batches(&self) -> Option<BatchReceiver<T>> {
        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Current lifecycle state
    ///
    /// A batcher whose start token was cancelled moves to `Stopped` once its
    /// timer task has exited.
    pub fn state(&self) -> BatcherState {
        let mut lifecycle = self.lifecycle();
        lifecycle.sync();
        lifecycle.state
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Batcher<T> {
    fn drop(&mut self) {
        let lifecycle = self.lifecycle.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = lifecycle.token.take() {
            token.cancel();
        }
    }
}
