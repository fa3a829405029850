//! Tests for the batcher
//!
//! Covers both trigger paths, the lossy dispatch policy and the lifecycle.

#[cfg(test)]
mod tests {
    use crate::{
        BatchTrigger,
        batch::{BatchObserver, BatchSummary, Batcher, BatcherError, BatcherState, DropReason},
        config::BatchConfig,
    };
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::sleep;
    use tokio_util::sync::CancellationToken;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Dispatched(BatchSummary),
        Dropped(BatchSummary, DropReason),
        PendingDropped(usize),
    }

    /// Observer that keeps every event for later assertions
    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingObserver {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    impl BatchObserver for RecordingObserver {
        fn batch_dispatched(&self, summary: BatchSummary) {
            self.events.lock().unwrap().push(Event::Dispatched(summary));
        }

        fn batch_dropped(&self, summary: BatchSummary, reason: DropReason) {
            self.events.lock().unwrap().push(Event::Dropped(summary, reason));
        }

        fn pending_dropped(&self, count: usize) {
            self.events.lock().unwrap().push(Event::PendingDropped(count));
        }
    }

    /// Helper function to build a batch config
    fn config(max_batch_size: usize, timeout_ms: u64) -> BatchConfig {
        BatchConfig {
            max_batch_size,
            timeout_interval_ms: timeout_ms,
            channel_capacity: 100,
            flush_on_stop: false,
        }
    }

    fn batcher_with(config: &BatchConfig) -> (Batcher<u64>, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let batcher = Batcher::with_observer(config, observer.clone()).unwrap();
        (batcher, observer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_size_then_timeout_scenario() {
        let (batcher, _) = batcher_with(&config(3, 200));
        let mut batches = batcher.batches().unwrap();
        let token = CancellationToken::new();
        batcher.start(&token).unwrap();

        batcher.add_transaction(1).await.unwrap();
        batcher.add_transaction(2).await.unwrap();
        assert_eq!(batcher.pending_count().await, 2);

        // Third insertion seals synchronously
        batcher.add_transaction(3).await.unwrap();
        assert_eq!(batcher.pending_count().await, 0);
        let batch = batches.try_recv().expect("size-triggered batch");
        assert_eq!(batch.transactions, vec![1, 2, 3]);
        assert_eq!(batch.trigger, BatchTrigger::Size);
        assert!(batches.try_recv().is_none());

        batcher.add_transaction(4).await.unwrap();
        sleep(Duration::from_millis(250)).await;

        let batch = batches.try_recv().expect("timeout-triggered batch");
        assert_eq!(batch.transactions, vec![4]);
        assert_eq!(batch.trigger, BatchTrigger::Timeout);
        assert_eq!(batcher.pending_count().await, 0);
        assert!(batches.try_recv().is_none());

        batcher.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_size_trigger_emits_exactly_threshold() {
        // Timer never started, so only the size path can fire
        let (batcher, _) = batcher_with(&config(3, 60_000));
        let mut batches = batcher.batches().unwrap();

        for tx in 1..=5 {
            batcher.add_transaction(tx).await.unwrap();
        }

        let batch = batches.try_recv().unwrap();
        assert_eq!(batch.transactions, vec![1, 2, 3]);
        assert!(batches.try_recv().is_none());
        assert_eq!(batcher.pending_count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_ticks_produce_no_batches() {
        let (batcher, observer) = batcher_with(&config(10, 100));
        let mut batches = batcher.batches().unwrap();
        batcher.start(&CancellationToken::new()).unwrap();

        sleep(Duration::from_millis(350)).await;
        assert!(batches.try_recv().is_none());

        batcher.add_transaction(7).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(batches.try_recv().unwrap().transactions, vec![7]);

        // Ticks after the buffer was drained stay silent
        sleep(Duration::from_millis(300)).await;
        assert!(batches.try_recv().is_none());
        assert_eq!(observer.events().len(), 1);

        batcher.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_transaction_sealed_after_one_period() {
        let (batcher, _) = batcher_with(&config(100, 200));
        let mut batches = batcher.batches().unwrap();
        batcher.start(&CancellationToken::new()).unwrap();

        batcher.add_transaction(42).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        assert!(batches.try_recv().is_none());

        sleep(Duration::from_millis(150)).await;
        let batch = batches.try_recv().unwrap();
        assert_eq!(batch.transactions, vec![42]);
        assert_eq!(batch.trigger, BatchTrigger::Timeout);
        assert!(batches.try_recv().is_none());

        batcher.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_lose_and_duplicate_nothing() {
        const PRODUCERS: u64 = 8;
        const PER_PRODUCER: u64 = 250;

        let config = BatchConfig {
            max_batch_size: 7,
            timeout_interval_ms: 2,
            channel_capacity: 10_000,
            flush_on_stop: true,
        };
        let (batcher, observer) = batcher_with(&config);
        let batcher = Arc::new(batcher);
        let mut batches = batcher.batches().unwrap();
        batcher.start(&CancellationToken::new()).unwrap();

        let mut handles = Vec::new();
        for producer in 0..PRODUCERS {
            let batcher = batcher.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..PER_PRODUCER {
                    batcher.add_transaction(producer * 1_000_000 + i).await.unwrap();
                    if i % 50 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        batcher.stop().await.unwrap();

        let mut seen = Vec::new();
        let mut last_id = 0;
        while let Some(batch) = batches.try_recv() {
            assert!(batch.batch_id > last_id);
            assert!(!batch.is_empty());
            last_id = batch.batch_id;

            // Per-producer insertion order survives inside a batch
            for producer in 0..PRODUCERS {
                let own: Vec<_> = batch
                    .transactions
                    .iter()
                    .filter(|tx| **tx / 1_000_000 == producer)
                    .collect();
                assert!(own.windows(2).all(|w| w[0] < w[1]));
            }
            seen.extend(batch.transactions);
        }

        assert!(
            !observer
                .events()
                .iter()
                .any(|event| matches!(event, Event::Dropped(..)))
        );

        let mut expected: Vec<u64> = (0..PRODUCERS)
            .flat_map(|p| (0..PER_PRODUCER).map(move |i| p * 1_000_000 + i))
            .collect();
        seen.sort_unstable();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_full_channel_drops_whole_batch() {
        let config = BatchConfig {
            channel_capacity: 1,
            ..config(2, 60_000)
        };
        let (batcher, observer) = batcher_with(&config);
        let mut batches = batcher.batches().unwrap();

        for tx in 1..=4 {
            batcher.add_transaction(tx).await.unwrap();
        }

        // Second batch found the channel full and was discarded, not re-queued
        assert_eq!(batcher.pending_count().await, 0);
        assert_eq!(batches.try_recv().unwrap().transactions, vec![1, 2]);
        assert!(batches.try_recv().is_none());

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            Event::Dropped(
                BatchSummary {
                    batch_id: 2,
                    tx_count: 2,
                    trigger: BatchTrigger::Size,
                },
                DropReason::ChannelFull,
            )
        );

        // Capacity frees up once the consumer catches up
        batcher.add_transaction(5).await.unwrap();
        batcher.add_transaction(6).await.unwrap();
        let batch = batches.try_recv().unwrap();
        assert_eq!(batch.batch_id, 3);
        assert_eq!(batch.transactions, vec![5, 6]);
    }

    #[tokio::test]
    async fn test_dropped_consumer_reports_closed_channel() {
        let (batcher, observer) = batcher_with(&config(1, 60_000));
        drop(batcher.batches());

        batcher.add_transaction(1).await.unwrap();
        assert!(matches!(
            observer.events().as_slice(),
            [Event::Dropped(_, DropReason::ChannelClosed)]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_drops_pending_transactions() {
        let (batcher, observer) = batcher_with(&config(10, 200));
        let mut batches = batcher.batches().unwrap();
        batcher.start(&CancellationToken::new()).unwrap();

        batcher.add_transaction(1).await.unwrap();
        batcher.add_transaction(2).await.unwrap();
        batcher.stop().await.unwrap();

        assert_eq!(batcher.state(), BatcherState::Stopped);
        assert_eq!(observer.events(), vec![Event::PendingDropped(2)]);
        assert_eq!(batcher.pending_count().await, 0);
        assert!(matches!(
            batcher.add_transaction(3).await,
            Err(BatcherError::Stopped)
        ));

        sleep(Duration::from_secs(1)).await;
        assert!(batches.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_flushes_when_configured() {
        let config = BatchConfig {
            flush_on_stop: true,
            ..config(10, 200)
        };
        let (batcher, _) = batcher_with(&config);
        let mut batches = batcher.batches().unwrap();
        batcher.start(&CancellationToken::new()).unwrap();

        batcher.add_transaction(1).await.unwrap();
        batcher.add_transaction(2).await.unwrap();
        batcher.stop().await.unwrap();

        let batch = batches.try_recv().unwrap();
        assert_eq!(batch.transactions, vec![1, 2]);
        assert_eq!(batch.trigger, BatchTrigger::Shutdown);
        assert!(batches.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancellation_tears_down() {
        let (batcher, observer) = batcher_with(&config(10, 200));
        let token = CancellationToken::new();
        batcher.start(&token).unwrap();
        batcher.add_transaction(1).await.unwrap();

        token.cancel();
        while batcher.state() != BatcherState::Stopped {
            sleep(Duration::from_millis(1)).await;
        }

        assert_eq!(observer.events(), vec![Event::PendingDropped(1)]);
        assert!(matches!(
            batcher.add_transaction(2).await,
            Err(BatcherError::Stopped)
        ));
        assert!(matches!(
            batcher.start(&CancellationToken::new()),
            Err(BatcherError::InvalidState { operation: "start", state: BatcherState::Stopped })
        ));

        // One stop still joins the exited timer task, a second one is misuse
        batcher.stop().await.unwrap();
        assert!(matches!(
            batcher.stop().await,
            Err(BatcherError::InvalidState { operation: "stop", state: BatcherState::Stopped })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parent_cancellation_flushes_before_closing() {
        for _ in 0..100 {
            let config = BatchConfig {
                flush_on_stop: true,
                ..config(10, 60_000)
            };
            let (batcher, observer) = batcher_with(&config);
            let mut batches = batcher.batches().unwrap();
            let token = CancellationToken::new();
            batcher.start(&token).unwrap();
            batcher.add_transaction(1).await.unwrap();

            // The consumer only sees the end of the channel after the final batch
            token.cancel();
            let batch = batches.recv().await.expect("flushed batch");
            assert_eq!(batch.transactions, vec![1]);
            assert_eq!(batch.trigger, BatchTrigger::Shutdown);
            assert!(batches.recv().await.is_none());

            batcher.stop().await.unwrap();
            assert!(
                !observer
                    .events()
                    .iter()
                    .any(|event| matches!(event, Event::Dropped(..)))
            );
        }
    }

    #[tokio::test]
    async fn test_stop_closes_consumer_channel() {
        let (batcher, _) = batcher_with(&config(2, 60_000));
        let mut batches = batcher.batches().unwrap();
        batcher.start(&CancellationToken::new()).unwrap();

        batcher.add_transaction(1).await.unwrap();
        batcher.add_transaction(2).await.unwrap();
        batcher.stop().await.unwrap();

        // Batches sent before stop stay readable, then the channel ends
        assert_eq!(batches.recv().await.unwrap().transactions, vec![1, 2]);
        assert!(batches.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_lifecycle_misuse_is_reported() {
        let (batcher, _) = batcher_with(&config(10, 200));
        let token = CancellationToken::new();

        assert!(matches!(
            batcher.stop().await,
            Err(BatcherError::InvalidState { operation: "stop", state: BatcherState::Idle })
        ));

        batcher.start(&token).unwrap();
        assert_eq!(batcher.state(), BatcherState::Running);
        assert!(matches!(
            batcher.start(&token),
            Err(BatcherError::InvalidState { operation: "start", state: BatcherState::Running })
        ));

        batcher.stop().await.unwrap();
        assert!(matches!(
            batcher.stop().await,
            Err(BatcherError::InvalidState { state: BatcherState::Stopped, .. })
        ));
        assert!(matches!(
            batcher.start(&token),
            Err(BatcherError::InvalidState { state: BatcherState::Stopped, .. })
        ));
    }

    #[tokio::test]
    async fn test_consumer_handle_taken_once() {
        let (batcher, _) = batcher_with(&config(10, 200));
        assert!(batcher.batches().is_some());
        assert!(batcher.batches().is_none());
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(Batcher::<u64>::new(&config(0, 200)).is_err());
        assert!(Batcher::<u64>::new(&config(10, 0)).is_err());
    }
}
