#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use http_body_util::BodyExt;

use image_request_intake::intake::IntakeService;
use image_request_intake::model::{GenerationRequest, JobId, NewGenerationRequest};
use image_request_intake::notify::WebhookNotifier;
use image_request_intake::routes;
use image_request_intake::storage::{ObjectStorage, StorageError, UploadOptions};
use image_request_intake::store::{JobStore, StoreError};

pub const BOUNDARY: &str = "intake-test-boundary";
pub const CDN: &str = "https://cdn.test/assets";

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub bytes: Vec<u8>,
    pub options: UploadOptions,
}

/// Object storage that keeps uploads in memory and can fail on the k-th attempt.
#[derive(Default)]
pub struct RecordingStorage {
    fail_on_attempt: Option<usize>,
    attempts: AtomicUsize,
    objects: Mutex<Vec<StoredObject>>,
}

impl RecordingStorage {
    pub fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on_attempt: Some(attempt),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> Result<String, StorageError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_attempt == Some(attempt) {
            return Err(StorageError::Rejected {
                status: 400,
                message: "Bucket not found".to_string(),
            });
        }
        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            bytes: bytes.to_vec(),
            options: options.clone(),
        });
        Ok(key.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{CDN}/{path}")
    }
}

/// Job store that records inserts and hands out sequential integer ids.
#[derive(Default)]
pub struct RecordingJobStore {
    fail: bool,
    inserted: Mutex<Vec<NewGenerationRequest>>,
}

impl RecordingJobStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn inserted(&self) -> Vec<NewGenerationRequest> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobStore for RecordingJobStore {
    async fn insert(&self, request: NewGenerationRequest) -> Result<GenerationRequest, StoreError> {
        if self.fail {
            return Err(StoreError::Rejected {
                status: 500,
                message: "connection refused".to_string(),
            });
        }
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(request.clone());
        let id = JobId::Int(inserted.len() as i64);
        Ok(GenerationRequest::from_new(id, request, Some(chrono::Utc::now())))
    }
}

/// Job store whose insert panics, standing in for a bug below the handler.
pub struct PanickingJobStore;

#[async_trait]
impl JobStore for PanickingJobStore {
    async fn insert(&self, _request: NewGenerationRequest) -> Result<GenerationRequest, StoreError> {
        panic!("job store exploded");
    }
}

pub fn build_test_app(
    storage: Arc<RecordingStorage>,
    jobs: Arc<dyn JobStore>,
    notifier: WebhookNotifier,
) -> Router {
    let service = IntakeService::new(storage, jobs, notifier);
    routes::router(service, 10 * 1024 * 1024, None)
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn image<'a>(file_name: &'a str, bytes: &'a [u8]) -> Part<'a> {
    Part::File {
        name: "images",
        file_name,
        content_type: "image/png",
        bytes,
    }
}

pub fn valid_fields() -> Vec<Part<'static>> {
    vec![
        Part::Text("prompt", "a red fox"),
        Part::Text("aspect_ratio", "1:1"),
        Part::Text("resolution", "1024x1024"),
        Part::Text("output_format", "png"),
    ]
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(routes::GENERATE_IMAGE_ROUTE)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}
