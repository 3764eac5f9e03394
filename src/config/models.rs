// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub probe: ProbeConfig,
    pub history: HistoryConfig,
    pub scheduler: SchedulerConfig,
    pub metrics: MetricsConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.probe.timeout_secs == 0 {
            bail!("probe.timeout_secs must be greater than zero");
        }
        if self.probe.max_concurrency == 0 {
            bail!("probe.max_concurrency must be greater than zero");
        }
        if self.history.capacity == 0 {
            bail!("history.capacity must be greater than zero");
        }
        let minutes = self.scheduler.interval_minutes;
        if minutes == 0 || 60 % minutes != 0 {
            bail!(
                "scheduler.interval_minutes must divide an hour evenly, got {}",
                minutes
            );
        }
        if !self.metrics.path.starts_with('/') {
            bail!("metrics.path must start with '/', got {:?}", self.metrics.path);
        }
        self.server.addr()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub urls_file: String,
    pub checks_file: String,
}

impl StorageConfig {
    pub fn urls_path(&self) -> PathBuf {
        self.data_dir.join(&self.urls_file)
    }

    pub fn checks_path(&self) -> PathBuf {
        self.data_dir.join(&self.checks_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            urls_file: "urls.json".to_string(),
            checks_file: "checks.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub timeout_secs: u64,
    pub max_concurrency: usize,
    pub user_agent: String,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_concurrency: 64,
            user_agent: concat!("uptime-monitor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: crate::history::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub interval_minutes: u32,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_minutes) * 60)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
            path: "/metrics".to_string(),
        }
    }
}
