// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uptime_monitor::config::ProbeConfig;
use uptime_monitor::history::HistoryStore;
use uptime_monitor::probe::HttpProber;
use uptime_monitor::registry::UrlRegistry;
use uptime_monitor::storage::JsonFileStorage;
use uptime_monitor::{Monitor, Probe, ProbeResult};

/// Answers from a fixed table: `Some(code)` completes with that status,
/// `None` fails with a timeout after 10s of simulated latency.
pub struct ScriptedProber {
    outcomes: HashMap<String, (Option<u16>, u64)>,
}

impl ScriptedProber {
    pub fn new(outcomes: &[(&str, Option<u16>, u64)]) -> Self {
        Self {
            outcomes: outcomes
                .iter()
                .map(|(url, code, ms)| (url.to_string(), (*code, *ms)))
                .collect(),
        }
    }
}

#[async_trait]
impl Probe for ScriptedProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        match self.outcomes.get(url) {
            Some((Some(code), ms)) => ProbeResult::completed(url, *code, *ms),
            Some((None, ms)) => ProbeResult::failed(url, "timeout", *ms),
            None => ProbeResult::failed(url, "getaddrinfo ENOTFOUND", 1),
        }
    }
}

pub async fn file_monitor(dir: &Path, prober: Arc<dyn Probe>) -> Monitor {
    let registry = UrlRegistry::open(Arc::new(JsonFileStorage::<String>::new(
        dir.join("urls.json"),
    )))
    .await
    .unwrap();
    let history = HistoryStore::open(
        Arc::new(JsonFileStorage::<ProbeResult>::new(dir.join("checks.json"))),
        1000,
    )
    .await
    .unwrap();

    Monitor::new(registry, history, prober, 16, None)
}

pub fn http_prober(timeout_secs: u64) -> Arc<dyn Probe> {
    Arc::new(
        HttpProber::new(&ProbeConfig {
            timeout_secs,
            ..ProbeConfig::default()
        })
        .unwrap(),
    )
}
