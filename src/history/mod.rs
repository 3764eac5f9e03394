// src/history/mod.rs
mod store;

pub use store::{HistoryStore, DEFAULT_CAPACITY};
