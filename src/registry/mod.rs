// src/registry/mod.rs
mod pool;
mod validate;

pub use pool::{RegistryError, UrlRegistry};
pub use validate::is_valid_url;
