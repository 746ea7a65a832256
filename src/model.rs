use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the job datastore at insert time.
///
/// Datastores disagree on id types (serial integers, uuids), so the id is
/// carried through exactly as the datastore produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Int(i64),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Int(value) => write!(f, "{value}"),
            JobId::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
    /// Any state the downstream worker writes that this service does not know.
    #[serde(other)]
    Unknown,
}

/// Insert payload for a new generation job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGenerationRequest {
    pub prompt: String,
    pub images: Vec<String>,
    pub aspect_ratio: String,
    pub resolution: String,
    pub output_format: String,
    pub status: JobStatus,
}

/// A persisted generation job as returned by the datastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub id: JobId,
    pub prompt: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub aspect_ratio: String,
    pub resolution: String,
    pub output_format: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl GenerationRequest {
    pub fn from_new(
        id: JobId,
        request: NewGenerationRequest,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            prompt: request.prompt,
            images: request.images,
            aspect_ratio: request.aspect_ratio,
            resolution: request.resolution,
            output_format: request.output_format,
            status: request.status,
            created_at,
        }
    }
}
