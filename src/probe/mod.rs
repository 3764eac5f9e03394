// src/probe/mod.rs
mod prober;
mod result;

pub use prober::{HttpProber, Probe};
pub use result::{ProbeResult, ProbeStatus};
