// src/storage/file.rs
use super::{Storage, StorageError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// A JSON array kept in a single file.
///
/// Writes go to a sibling `.tmp` file which is fsynced and then renamed over
/// the target, so readers see either the previous or the new document.
#[derive(Debug)]
pub struct JsonFileStorage<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStorage<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl<T> Storage<T> for JsonFileStorage<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> Result<Vec<T>, StorageError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, items: &[T]) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(items)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(parent, e))?;
        }

        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| self.io_error(&tmp, e))?;
        file.write_all(&body)
            .await
            .map_err(|e| self.io_error(&tmp, e))?;
        file.sync_all()
            .await
            .map_err(|e| self.io_error(&tmp, e))?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(&self.path, e))?;

        debug!("Persisted {} records to {}", items.len(), self.path.display());
        Ok(())
    }
}
