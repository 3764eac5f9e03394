// src/scheduler/mod.rs
mod runner;
mod ticker;

pub use runner::{Scheduler, SchedulerState};
pub use ticker::next_tick_after;
