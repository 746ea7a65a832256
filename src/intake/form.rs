use axum::{body::Bytes, extract::Multipart};

use crate::error::IntakeError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One file part from the `images` field.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// The raw submission, before any field is checked.
#[derive(Debug, Default)]
pub struct IntakeForm {
    pub prompt: Option<String>,
    pub aspect_ratio: Option<String>,
    pub resolution: Option<String>,
    pub output_format: Option<String>,
    pub images: Vec<ImageUpload>,
}

/// A submission whose required fields are present and whose files are non-empty.
#[derive(Debug, Clone)]
pub struct Submission {
    pub prompt: String,
    pub aspect_ratio: String,
    pub resolution: String,
    pub output_format: String,
    pub images: Vec<ImageUpload>,
}

fn keep_first(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

fn multipart_failure(err: axum::extract::multipart::MultipartError) -> IntakeError {
    IntakeError::Internal(err.body_text())
}

impl IntakeForm {
    /// Drain a multipart body. Files are buffered so validation can run before
    /// anything is uploaded.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, IntakeError> {
        let mut form = IntakeForm::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_failure)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "prompt" | "aspect_ratio" | "resolution" | "output_format" => {
                    let value = field.text().await.map_err(multipart_failure)?;
                    let slot = match name.as_str() {
                        "prompt" => &mut form.prompt,
                        "aspect_ratio" => &mut form.aspect_ratio,
                        "resolution" => &mut form.resolution,
                        _ => &mut form.output_format,
                    };
                    keep_first(slot, value);
                }
                "images" => {
                    // Plain text values under `images` are not files.
                    let Some(file_name) = field.file_name().map(str::to_string) else {
                        continue;
                    };
                    let content_type = field
                        .content_type()
                        .unwrap_or(DEFAULT_CONTENT_TYPE)
                        .to_string();
                    let bytes = field.bytes().await.map_err(multipart_failure)?;
                    form.images.push(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                _ => {}
            }
        }
        Ok(form)
    }

    pub fn validate(self) -> Result<Submission, IntakeError> {
        let required = |value: Option<String>| value.filter(|v| !v.is_empty());
        let (Some(prompt), Some(aspect_ratio), Some(resolution), Some(output_format)) = (
            required(self.prompt),
            required(self.aspect_ratio),
            required(self.resolution),
            required(self.output_format),
        ) else {
            return Err(IntakeError::Validation);
        };

        let images = self
            .images
            .into_iter()
            .filter(|image| !image.bytes.is_empty())
            .collect();

        Ok(Submission {
            prompt,
            aspect_ratio,
            resolution,
            output_format,
            images,
        })
    }
}
