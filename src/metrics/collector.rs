// src/metrics/collector.rs
use crate::probe::ProbeResult;
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    // Probe metrics
    pub probes_total: IntCounterVec,
    pub probe_duration_seconds: HistogramVec,

    // Sweep metrics
    pub sweeps_total: IntCounterVec,
    pub sweeps_skipped_total: IntCounter,

    // Store metrics
    pub history_entries: IntGauge,
    pub monitored_urls: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let probes_total = IntCounterVec::new(
            Opts::new("uptime_probes_total", "Total number of probes by outcome"),
            &["status"],
        )?;
        registry.register(Box::new(probes_total.clone()))?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new("uptime_probe_duration_seconds", "Probe duration in seconds")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["status"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let sweeps_total = IntCounterVec::new(
            Opts::new("uptime_sweeps_total", "Completed sweeps by trigger"),
            &["trigger"],
        )?;
        registry.register(Box::new(sweeps_total.clone()))?;

        let sweeps_skipped_total = IntCounter::new(
            "uptime_sweeps_skipped_total",
            "Scheduler ticks skipped because a sweep was still running",
        )?;
        registry.register(Box::new(sweeps_skipped_total.clone()))?;

        let history_entries =
            IntGauge::new("uptime_history_entries", "Results retained in history")?;
        registry.register(Box::new(history_entries.clone()))?;

        let monitored_urls = IntGauge::new("uptime_monitored_urls", "Number of monitored URLs")?;
        registry.register(Box::new(monitored_urls.clone()))?;

        Ok(Self {
            probes_total,
            probe_duration_seconds,
            sweeps_total,
            sweeps_skipped_total,
            history_entries,
            monitored_urls,
        })
    }

    pub fn record_probe(&self, result: &ProbeResult) {
        let status = result.status.as_str();
        self.probes_total.with_label_values(&[status]).inc();
        self.probe_duration_seconds
            .with_label_values(&[status])
            .observe(result.response_time_ms as f64 / 1000.0);
    }

    pub fn record_sweep(&self, trigger: &str) {
        self.sweeps_total.with_label_values(&[trigger]).inc();
    }

    pub fn record_skipped_tick(&self) {
        self.sweeps_skipped_total.inc();
    }

    pub fn update_store_sizes(&self, urls: usize, history: usize) {
        self.monitored_urls.set(urls as i64);
        self.history_entries.set(history as i64);
    }
}
