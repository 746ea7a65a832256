pub mod local;
pub mod postgrest;

pub use local::LocalJobStore;
pub use postgrest::PostgrestJobStore;

use async_trait::async_trait;

use crate::model::{GenerationRequest, NewGenerationRequest};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// The datastore that owns generation job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert one record and return it with its generated id.
    async fn insert(&self, request: NewGenerationRequest) -> Result<GenerationRequest, StoreError>;
}
