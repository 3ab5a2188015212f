//! Poll scheduler.
//!
//! Runs the dispatcher on a fixed interval once the readiness gate opens.
//! Cycles never overlap; ticks that elapse during a long cycle are skipped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use super::dispatcher::PollDispatcher;

/// One-shot gate opened when the chat connection is ready.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    sender: Arc<watch::Sender<bool>>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Open the gate. Opening twice is a no-op.
    pub fn open(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_open(&self) -> bool {
        *self.sender.borrow()
    }

    /// Wait until the gate is open; returns immediately if it already is.
    pub async fn wait(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = receiver.wait_for(|open| *open).await;
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running scheduler task.
pub struct SchedulerHandle {
    shutdown: mpsc::Sender<()>,
    task: JoinHandle<()>,
    cycles: Arc<AtomicU64>,
}

impl SchedulerHandle {
    /// Number of cycles run so far (including aborted ones).
    pub fn completed_cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Stop the scheduler and wait for its task to finish.
    ///
    /// A cycle in progress is abandoned at its next await point.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(()).await;
        if let Err(e) = self.task.await {
            error!("Scheduler task failed: {}", e);
        }
    }
}

/// Spawn the poll loop on the current runtime.
pub fn spawn_scheduler(
    mut dispatcher: PollDispatcher,
    period: Duration,
    gate: ReadinessGate,
) -> SchedulerHandle {
    let (shutdown, mut shutdown_rx) = mpsc::channel::<()>(1);
    let cycles = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&cycles);

    let task = tokio::spawn(async move {
        tokio::select! {
            _ = gate.wait() => {}
            _ = shutdown_rx.recv() => {
                info!("Scheduler stopped before start");
                return;
            }
        }

        info!(
            "Scheduler started (interval: {} seconds, sources: {})",
            period.as_secs(),
            dispatcher.source_names().join(", ")
        );

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown_rx.recv() => break,
            }

            tokio::select! {
                result = dispatcher.run_cycle() => {
                    match result {
                        Ok(report) => info!(
                            "Cycle complete: {} subscriber(s) ({} skipped), {}/{} source(s) ok, {} item(s), {} sent, {} failed",
                            report.subscribers,
                            report.skipped_subscribers,
                            report.sources_ok,
                            report.sources_ok + report.sources_failed,
                            report.items_fetched,
                            report.sent,
                            report.failed_sends
                        ),
                        Err(e) => error!("Cycle aborted: {}", e),
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested during a cycle");
                    break;
                }
            }
        }

        info!("Scheduler stopped");
    });

    SchedulerHandle {
        shutdown,
        task,
        cycles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::notify::{DeliveryError, Notifier};
    use crate::registry::{ChannelId, SqliteSubscriberRegistry, SubscriberRegistry};
    use crate::scan::dispatcher::DispatchSettings;
    use crate::source::{FeedItem, FeedSource, SourceError};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct EmptySource;

    #[async_trait]
    impl FeedSource for EmptySource {
        fn name(&self) -> &str {
            "r/empty"
        }

        async fn fetch_recent(&self, _limit: usize) -> Result<Vec<FeedItem>, SourceError> {
            Ok(Vec::new())
        }
    }

    /// Source whose first fetch takes `first_delay`; later fetches are instant.
    struct SlowFirstSource {
        first_delay: Duration,
        starts: Mutex<Vec<Instant>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl SlowFirstSource {
        fn new(first_delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                first_delay,
                starts: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            })
        }

        fn starts(&self) -> Vec<Instant> {
            self.starts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FeedSource for SlowFirstSource {
        fn name(&self) -> &str {
            "r/slow"
        }

        async fn fetch_recent(&self, _limit: usize) -> Result<Vec<FeedItem>, SourceError> {
            let first = {
                let mut starts = self.starts.lock().unwrap();
                starts.push(Instant::now());
                starts.len() == 1
            };
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);

            if first {
                tokio::time::sleep(self.first_delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct NullNotifier;

    #[async_trait]
    impl Notifier for NullNotifier {
        async fn resolve_channel(&self, _: ChannelId) -> Result<Option<String>, DeliveryError> {
            Ok(Some("#general".to_string()))
        }

        async fn send_message(&self, _: ChannelId, _: &str) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    async fn test_dispatcher() -> (Database, PollDispatcher) {
        let db = Database::open_in_memory().await.unwrap();
        let registry = Arc::new(SqliteSubscriberRegistry::new(db.pool().clone()));
        let dispatcher = PollDispatcher::new(
            registry,
            Arc::new(NullNotifier),
            vec![Arc::new(EmptySource) as Arc<dyn FeedSource>],
            &["giveaway".to_string()],
            DispatchSettings {
                source_delay: Duration::ZERO,
                ..DispatchSettings::default()
            },
        )
        .unwrap();
        (db, dispatcher)
    }

    #[tokio::test]
    async fn test_gate_wait_after_open() {
        let gate = ReadinessGate::new();
        assert!(!gate.is_open());
        gate.open();
        gate.open();
        assert!(gate.is_open());
        tokio::time::timeout(Duration::from_secs(1), gate.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_gate_wakes_waiters() {
        let gate = ReadinessGate::new();
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        gate.open();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_scheduler_waits_for_gate() {
        let (_db, dispatcher) = test_dispatcher().await;
        let gate = ReadinessGate::new();
        let handle = spawn_scheduler(dispatcher, Duration::from_millis(10), gate.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.completed_cycles(), 0);

        gate.open();
        let mut waited = 0;
        while handle.completed_cycles() < 2 && waited < 200 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += 1;
        }
        assert!(handle.completed_cycles() >= 2);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_scheduler_shutdown_before_ready() {
        let (_db, dispatcher) = test_dispatcher().await;
        let handle = spawn_scheduler(dispatcher, Duration::from_millis(10), ReadinessGate::new());

        tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_scheduler_stops_cycling_after_shutdown() {
        let (_db, dispatcher) = test_dispatcher().await;
        let gate = ReadinessGate::new();
        gate.open();
        let handle = spawn_scheduler(dispatcher, Duration::from_secs(3600), gate);

        // First tick fires immediately
        let mut waited = 0;
        while handle.completed_cycles() < 1 && waited < 200 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += 1;
        }
        assert_eq!(handle.completed_cycles(), 1);

        let cycles = Arc::clone(&handle.cycles);
        tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .unwrap();
        assert_eq!(cycles.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_overrun_skips_missed_ticks() {
        let db = Database::open_in_memory().await.unwrap();
        let registry = Arc::new(SqliteSubscriberRegistry::new(db.pool().clone()));
        registry.set_destination("S1", ChannelId(100)).await.unwrap();

        let period = Duration::from_millis(200);
        let source = SlowFirstSource::new(Duration::from_millis(450));
        let dispatcher = PollDispatcher::new(
            registry,
            Arc::new(NullNotifier),
            vec![source.clone() as Arc<dyn FeedSource>],
            &["giveaway".to_string()],
            DispatchSettings {
                source_delay: Duration::ZERO,
                source_timeout: Duration::from_secs(5),
                ..DispatchSettings::default()
            },
        )
        .unwrap();

        let gate = ReadinessGate::new();
        gate.open();
        let handle = spawn_scheduler(dispatcher, period, gate);

        let mut waited = 0;
        while source.starts().len() < 3 && waited < 300 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += 1;
        }
        handle.shutdown().await;

        let starts = source.starts();
        assert!(starts.len() >= 3);
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);

        // The first cycle spans the ticks at 200ms and 400ms. One late tick
        // fires as soon as it finishes; the other is dropped and the next
        // cycle waits for the 600ms slot instead of running back to back.
        assert!(starts[1] - starts[0] >= Duration::from_millis(450));
        assert!(starts[2] - starts[1] >= Duration::from_millis(50));
        assert!(starts[2] - starts[0] >= Duration::from_millis(550));
    }
}
