use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{JobStore, StoreError};

use crate::model::{GenerationRequest, JobId, NewGenerationRequest};
use crate::supabase::{SupabaseConfig, check_response};

/// PostgREST `Accept` type that makes an insert return a single object.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Only the generated id is read back; other columns may drift freely.
#[derive(Deserialize)]
struct InsertedRow {
    id: JobId,
}

/// A table behind PostgREST (the Supabase database API).
#[derive(Clone, Debug)]
pub struct PostgrestJobStore {
    client: Client,
    config: SupabaseConfig,
    table: String,
}

impl PostgrestJobStore {
    pub fn new(client: Client, config: SupabaseConfig, table: String) -> Self {
        Self {
            client,
            config,
            table,
        }
    }
}

#[async_trait]
impl JobStore for PostgrestJobStore {
    async fn insert(&self, request: NewGenerationRequest) -> Result<GenerationRequest, StoreError> {
        let url = self.config.endpoint(["rest", "v1", self.table.as_str()]);
        let builder = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .json(&request);
        let response = self.config.authorize(builder).send().await?;
        let response = check_response(response)
            .await
            .map_err(|rejection| StoreError::Rejected {
                status: rejection.status.as_u16(),
                message: rejection.message,
            })?;
        let bytes = response.bytes().await?;
        let row: InsertedRow = serde_json::from_slice(&bytes)?;
        Ok(GenerationRequest::from_new(row.id, request, None))
    }
}
