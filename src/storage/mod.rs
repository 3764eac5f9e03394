// src/storage/mod.rs
mod file;
mod memory;

pub use file::JsonFileStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use std::path::PathBuf;

/// Persistence backend for an ordered collection of records.
///
/// `save` always replaces the whole collection; implementations must make the
/// replacement atomic so that `load` never observes a half-written state.
#[async_trait]
pub trait Storage<T>: Send + Sync {
    async fn load(&self) -> Result<Vec<T>, StorageError>;

    async fn save(&self, items: &[T]) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed data in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
