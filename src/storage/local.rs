use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{ObjectStorage, StorageError, UploadOptions};

/// Objects stored as plain files under `base_dir`, published at `base_url`.
///
/// The HTTP layer serves `base_dir` itself, so content type comes from the
/// key's extension and the cache directive from the serving route.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self { base_dir, base_url }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.resolve_path(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::Duplicate(key.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    pub fn get_public_url(&self, key: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let key = key.trim_start_matches('/');
        format!("{base}/{key}")
    }

    /// Map a key to a path under the root, refusing anything that would escape it.
    pub fn resolve_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let normalized = key.trim_start_matches('/');
        let relative = Path::new(normalized);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));
        if normalized.is_empty() || escapes {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalFileStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> Result<String, StorageError> {
        self.put(key, bytes).await?;
        tracing::debug!(
            key,
            size = bytes.len(),
            content_type = %options.content_type,
            "stored object on local disk"
        );
        Ok(key.trim_start_matches('/').to_string())
    }

    fn public_url(&self, path: &str) -> String {
        self.get_public_url(path)
    }
}
