// src/monitor/engine.rs
use crate::config::Config;
use crate::history::HistoryStore;
use crate::metrics::MetricsCollector;
use crate::probe::{HttpProber, Probe, ProbeResult};
use crate::registry::{RegistryError, UrlRegistry};
use crate::stats::{stats_for, StatsReport};
use crate::storage::{JsonFileStorage, StorageError};
use anyhow::Context;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTrigger {
    OnDemand,
    Scheduled,
}

impl SweepTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepTrigger::OnDemand => "on_demand",
            SweepTrigger::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for SweepTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Failed to record sweep results: {0}")]
    History(#[from] StorageError),
}

/// The monitoring engine: registry, prober and history wired together.
pub struct Monitor {
    registry: UrlRegistry,
    history: HistoryStore,
    prober: Arc<dyn Probe>,
    limiter: Arc<Semaphore>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Monitor {
    pub fn new(
        registry: UrlRegistry,
        history: HistoryStore,
        prober: Arc<dyn Probe>,
        max_concurrency: usize,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        let monitor = Self {
            registry,
            history,
            prober,
            limiter: Arc::new(Semaphore::new(max_concurrency.max(1))),
            metrics,
        };
        monitor.update_store_metrics();
        monitor
    }

    /// Open the JSON-file stores under `storage.data_dir` and build an HTTP
    /// prober from `config`.
    pub async fn from_config(
        config: &Config,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> anyhow::Result<Self> {
        let urls = Arc::new(JsonFileStorage::<String>::new(config.storage.urls_path()));
        let checks = Arc::new(JsonFileStorage::<ProbeResult>::new(config.storage.checks_path()));

        let registry = UrlRegistry::open(urls)
            .await
            .context("Failed to load monitored URLs")?;
        let history = HistoryStore::open(checks, config.history.capacity)
            .await
            .context("Failed to load check history")?;
        let prober = HttpProber::new(&config.probe).context("Failed to create HTTP client")?;

        Ok(Self::new(
            registry,
            history,
            Arc::new(prober),
            config.probe.max_concurrency,
            metrics,
        ))
    }

    pub fn registry(&self) -> &UrlRegistry {
        &self.registry
    }

    pub fn history_store(&self) -> &HistoryStore {
        &self.history
    }

    pub async fn add_urls<I, S>(&self, candidates: I) -> Result<Vec<String>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = self.registry.add(candidates).await?;
        self.update_store_metrics();
        Ok(urls)
    }

    pub async fn remove_url(&self, url: &str) -> Result<Vec<String>, RegistryError> {
        let urls = self.registry.remove(url).await?;
        self.update_store_metrics();
        Ok(urls)
    }

    pub fn history(&self) -> Vec<ProbeResult> {
        self.history.all()
    }

    /// Statistics for every registered URL against the current history.
    pub fn stats(&self) -> StatsReport {
        let urls = self.registry.snapshot();
        let history = self.history.snapshot();
        stats_for(urls.as_slice(), history.as_slice())
    }

    /// Probe every URL concurrently and wait for all of them. Results come
    /// back in the order of `urls`.
    pub async fn probe_all(&self, urls: &[String]) -> Vec<ProbeResult> {
        let mut tasks = Vec::with_capacity(urls.len());

        for url in urls {
            let prober = self.prober.clone();
            let limiter = self.limiter.clone();
            let target = url.clone();
            let task = tokio::spawn(
                async move {
                    // The semaphore is never closed.
                    let _permit = limiter.acquire_owned().await.ok();
                    prober.probe(&target).await
                }
                .in_current_span(),
            );
            tasks.push(task);
        }

        let joined = futures::future::join_all(tasks).await;

        urls.iter()
            .zip(joined)
            .map(|(url, outcome)| match outcome {
                Ok(result) => result,
                Err(e) => {
                    error!("Probe task for {} failed: {}", url, e);
                    ProbeResult::failed(url.as_str(), format!("probe task failed: {}", e), 0)
                }
            })
            .collect()
    }

    /// One fan-out/fan-in sweep over `urls`; results are appended to the
    /// history as a single block and returned. An empty set does nothing.
    pub async fn run_sweep(
        &self,
        urls: &[String],
        trigger: SweepTrigger,
    ) -> Result<Vec<ProbeResult>, MonitorError> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let span = info_span!("sweep", id = %Uuid::new_v4(), %trigger, urls = urls.len());
        self.sweep_inner(urls, trigger).instrument(span).await
    }

    /// Sweep the current registry snapshot.
    pub async fn check_all(&self, trigger: SweepTrigger) -> Result<Vec<ProbeResult>, MonitorError> {
        let urls = self.registry.snapshot();
        self.run_sweep(urls.as_slice(), trigger).await
    }

    async fn sweep_inner(
        &self,
        urls: &[String],
        trigger: SweepTrigger,
    ) -> Result<Vec<ProbeResult>, MonitorError> {
        let started = Instant::now();
        let results = self.probe_all(urls).await;

        if let Some(metrics) = &self.metrics {
            for result in &results {
                metrics.record_probe(result);
            }
        }

        self.history.append(&results).await?;

        let up = results.iter().filter(|r| r.is_up()).count();
        info!(
            "Sweep complete in {:?}: {} up, {} down",
            started.elapsed(),
            up,
            results.len() - up
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_sweep(trigger.as_str());
        }
        self.update_store_metrics();

        Ok(results)
    }

    pub(crate) fn update_store_metrics(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.update_store_sizes(self.registry.len(), self.history.len());
        }
    }
}
