use chrono::Utc;
use rand::Rng;

use super::form::ImageUpload;
use crate::error::IntakeError;
use crate::storage::{ObjectStorage, UploadOptions};

const SUFFIX_LEN: usize = 6;

/// Substring after the last `.` of the file name, if there is a non-empty one.
pub fn file_extension(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

pub fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect()
}

/// `<timestamp-ms>-<suffix>[.<ext>]`
pub fn storage_key(timestamp_ms: i64, suffix: &str, file_name: &str) -> String {
    match file_extension(file_name) {
        Some(ext) => format!("{timestamp_ms}-{suffix}.{ext}"),
        None => format!("{timestamp_ms}-{suffix}"),
    }
}

/// Upload every asset in order and return their public URLs in the same order.
///
/// Stops at the first failure; assets uploaded before it stay in storage.
pub async fn upload_assets(
    storage: &dyn ObjectStorage,
    images: &[ImageUpload],
) -> Result<Vec<String>, IntakeError> {
    let mut urls = Vec::with_capacity(images.len());
    for image in images {
        let key = storage_key(Utc::now().timestamp_millis(), &random_suffix(), &image.file_name);
        let options = UploadOptions::for_asset(&image.content_type);
        let path = storage
            .upload(&key, &image.bytes, &options)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, key = %key, "Error uploading file");
                IntakeError::Upload(err)
            })?;
        urls.push(storage.public_url(&path));
    }
    Ok(urls)
}
