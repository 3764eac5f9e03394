// src/scheduler/runner.rs
use super::ticker::{next_tick_after, until};
use crate::config::SchedulerConfig;
use crate::metrics::MetricsCollector;
use crate::monitor::{Monitor, SweepTrigger};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Sweeping,
}

/// Periodic sweeps on wall-clock aligned ticks, never more than one at a time.
pub struct Scheduler {
    monitor: Arc<Monitor>,
    period: Duration,
    metrics: Option<Arc<MetricsCollector>>,
    state_tx: watch::Sender<SchedulerState>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

/// Puts the scheduler back to Idle when the sweep ends, even on panic.
struct SweepGuard<'a>(&'a watch::Sender<SchedulerState>);

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(SchedulerState::Idle);
    }
}

impl Scheduler {
    pub fn new(
        monitor: Arc<Monitor>,
        config: &SchedulerConfig,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        let (state_tx, _) = watch::channel(SchedulerState::Idle);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            monitor,
            period: config.interval(),
            metrics,
            state_tx,
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state_tx.subscribe()
    }

    /// Run the timer loop until `shutdown` is called.
    pub async fn start(self: Arc<Self>) {
        let mut shutdown_rx = self.shutdown_rx.clone();
        let mut last_tick = Utc::now();

        info!(
            "Starting scheduler with interval: {:?}, first tick at {}",
            self.period,
            next_tick_after(last_tick, self.period)
        );

        loop {
            let now = Utc::now();
            let next = next_tick_after(now.max(last_tick), self.period);

            tokio::select! {
                _ = tokio::time::sleep(until(next, now)) => {
                    last_tick = next;
                    self.tick();
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Handle one tick: start a sweep of the current registry unless one is
    /// already running. Returns the sweep task, or `None` if the tick was
    /// skipped.
    pub fn tick(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let began = self.state_tx.send_if_modified(|state| match state {
            SchedulerState::Idle => {
                *state = SchedulerState::Sweeping;
                true
            }
            SchedulerState::Sweeping => false,
        });

        if !began {
            warn!("Previous sweep still running, skipping tick");
            if let Some(metrics) = &self.metrics {
                metrics.record_skipped_tick();
            }
            return None;
        }

        let scheduler = self.clone();
        Some(tokio::spawn(async move {
            let _guard = SweepGuard(&scheduler.state_tx);
            scheduler.sweep().await;
        }))
    }

    async fn sweep(&self) {
        info!("Running automatic health checks...");

        match self.monitor.check_all(SweepTrigger::Scheduled).await {
            Ok(results) if results.is_empty() => {
                info!("No URLs registered, nothing to check");
            }
            Ok(results) => {
                info!("Checked {} URLs", results.len());
            }
            Err(e) => {
                error!("Error in automatic health check, abandoning tick: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStore;
    use crate::probe::{Probe, ProbeResult};
    use crate::registry::UrlRegistry;
    use crate::storage::{MemoryStorage, Storage};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Blocks every probe until released.
    struct GatedProber {
        gate: Notify,
    }

    #[async_trait]
    impl Probe for GatedProber {
        async fn probe(&self, url: &str) -> ProbeResult {
            self.gate.notified().await;
            ProbeResult::completed(url, 200, 1)
        }
    }

    async fn scheduler(
        urls: &[&str],
        prober: Arc<dyn Probe>,
    ) -> (Arc<Scheduler>, Arc<MemoryStorage<ProbeResult>>) {
        let url_storage = Arc::new(MemoryStorage::with_items(
            urls.iter().map(|u| u.to_string()).collect(),
        ));
        let checks = Arc::new(MemoryStorage::new());
        let registry = UrlRegistry::open(url_storage).await.unwrap();
        let history = HistoryStore::open(checks.clone(), 1000).await.unwrap();
        let monitor = Arc::new(Monitor::new(registry, history, prober, 4, None));

        let scheduler = Arc::new(Scheduler::new(
            monitor,
            &SchedulerConfig::default(),
            None,
        ));
        (scheduler, checks)
    }

    #[tokio::test]
    async fn tick_while_sweeping_is_skipped() {
        let prober = Arc::new(GatedProber { gate: Notify::new() });
        let (scheduler, checks) = scheduler(&["https://a.test"], prober.clone()).await;

        let first = scheduler.tick().expect("first tick starts a sweep");
        assert_eq!(scheduler.state(), SchedulerState::Sweeping);

        assert!(scheduler.tick().is_none());

        prober.gate.notify_one();
        first.await.unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(checks.load().await.unwrap().len(), 1);

        let second = scheduler.tick().expect("idle scheduler starts again");
        prober.gate.notify_one();
        second.await.unwrap();
        assert_eq!(checks.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_registry_sweep_completes_without_append() {
        let prober = Arc::new(GatedProber { gate: Notify::new() });
        let (scheduler, checks) = scheduler(&[], prober).await;

        scheduler.tick().unwrap().await.unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(checks.save_count(), 0);
    }

    #[tokio::test]
    async fn persistence_failure_abandons_tick_and_returns_to_idle() {
        let prober = Arc::new(GatedProber { gate: Notify::new() });
        let (scheduler, checks) = scheduler(&["https://a.test"], prober.clone()).await;
        checks.set_fail_saves(true);

        let sweep = scheduler.tick().unwrap();
        prober.gate.notify_one();
        sweep.await.unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(checks.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn shutdown_stops_the_timer_loop() {
        let prober = Arc::new(GatedProber { gate: Notify::new() });
        let (scheduler, _) = scheduler(&[], prober).await;

        let handle = tokio::spawn(scheduler.clone().start());
        tokio::task::yield_now().await;
        scheduler.shutdown();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler loop exits after shutdown")
            .unwrap();
    }
}
