// src/stats/mod.rs
mod aggregator;

pub use aggregator::{stats_for, StatsReport, UrlStats};
