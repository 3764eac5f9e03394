// src/lib.rs
pub mod api;
pub mod config;
pub mod history;
pub mod metrics;
pub mod monitor;
pub mod probe;
pub mod registry;
pub mod scheduler;
pub mod server;
pub mod stats;
pub mod storage;

pub use monitor::{Monitor, MonitorError, SweepTrigger};
pub use probe::{Probe, ProbeResult, ProbeStatus};
