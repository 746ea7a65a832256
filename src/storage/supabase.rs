use async_trait::async_trait;
use reqwest::Client;

use super::{ObjectStorage, StorageError, UploadOptions};
use crate::supabase::{SupabaseConfig, check_response};

/// A bucket in Supabase Storage, addressed through its REST API.
#[derive(Clone, Debug)]
pub struct SupabaseStorage {
    client: Client,
    config: SupabaseConfig,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(client: Client, config: SupabaseConfig, bucket: String) -> Self {
        Self {
            client,
            config,
            bucket,
        }
    }

    fn object_segments<'a>(&'a self, prefix: &'a [&'a str], path: &'a str) -> Vec<&'a str> {
        let mut segments = prefix.to_vec();
        segments.push(&self.bucket);
        segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
        segments
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> Result<String, StorageError> {
        let url = self
            .config
            .endpoint(self.object_segments(&["storage", "v1", "object"], key));
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, &options.content_type)
            .header(reqwest::header::CACHE_CONTROL, &options.cache_control)
            .header("x-upsert", "false")
            .body(bytes.to_vec());
        let response = self.config.authorize(request).send().await?;
        check_response(response)
            .await
            .map_err(|rejection| StorageError::Rejected {
                status: rejection.status.as_u16(),
                message: rejection.message,
            })?;
        Ok(key.trim_start_matches('/').to_string())
    }

    fn public_url(&self, path: &str) -> String {
        self.config
            .endpoint(self.object_segments(&["storage", "v1", "object", "public"], path))
            .to_string()
    }
}
