// src/monitor/mod.rs
mod engine;

pub use engine::{Monitor, MonitorError, SweepTrigger};
