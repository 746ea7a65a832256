pub mod local;
pub mod supabase;

pub use local::LocalFileStorage;
pub use supabase::SupabaseStorage;

use async_trait::async_trait;

/// Intermediate caches may keep an uploaded asset for one hour.
pub const ASSET_CACHE_CONTROL: &str = "max-age=3600";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    pub cache_control: String,
}

impl UploadOptions {
    pub fn for_asset(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            cache_control: ASSET_CACHE_CONTROL.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("The resource already exists")]
    Duplicate(String),

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// Durable object storage for uploaded reference assets.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write `bytes` under `key` and return the stored object's path.
    ///
    /// Never overwrites an existing object.
    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> Result<String, StorageError>;

    fn public_url(&self, path: &str) -> String;
}
