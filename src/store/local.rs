use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use uuid::Uuid;

use super::{JobStore, StoreError};
use crate::model::{GenerationRequest, JobId, NewGenerationRequest};

/// Job records kept as one pretty-printed JSON document per job.
#[derive(Clone, Debug)]
pub struct LocalJobStore {
    dir: PathBuf,
}

impl LocalJobStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn record_path(&self, id: &Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    pub async fn load(&self, id: &Uuid) -> Result<Option<GenerationRequest>, StoreError> {
        match fs::read(self.record_path(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Write through a staging file and rename, so readers only ever see complete
/// records. The staging file is removed whenever the write does not land.
async fn write_atomically(staging: &Path, target: &Path, payload: &[u8]) -> std::io::Result<()> {
    let result = match fs::write(staging, payload).await {
        Ok(()) => fs::rename(staging, target).await,
        Err(err) => Err(err),
    };
    if result.is_err() {
        let _ = fs::remove_file(staging).await;
    }
    result
}

#[async_trait]
impl JobStore for LocalJobStore {
    async fn insert(&self, request: NewGenerationRequest) -> Result<GenerationRequest, StoreError> {
        let id = Uuid::new_v4();
        let record = GenerationRequest::from_new(
            JobId::Text(id.to_string()),
            request,
            Some(Utc::now()),
        );
        let payload = serde_json::to_vec_pretty(&record)?;

        fs::create_dir_all(&self.dir).await?;
        let staging = self.dir.join(format!(".{id}.json.tmp"));
        write_atomically(&staging, &self.record_path(&id), &payload).await?;
        Ok(record)
    }
}
