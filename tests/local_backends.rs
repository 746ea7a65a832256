//! The service wired from configuration onto on-disk storage and job records.

mod common;

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use common::{image, multipart_request, valid_fields};
use image_request_intake::config::AppConfig;
use image_request_intake::model::JobStatus;
use image_request_intake::routes;
use image_request_intake::store::LocalJobStore;

#[tokio::test]
async fn uploaded_assets_are_served_at_their_public_url() {
    let root = tempfile::tempdir().unwrap();
    let storage_dir = root.path().join("storage");
    let jobs_dir = root.path().join("jobs");
    let vars: HashMap<&str, String> = HashMap::from([
        ("STORAGE_DIR", storage_dir.display().to_string()),
        ("JOBS_DIR", jobs_dir.display().to_string()),
        ("PUBLIC_BASE_URL", "https://intake.example.com".to_string()),
    ]);
    let config = AppConfig::from_lookup(|var| vars.get(var).cloned()).unwrap();

    let service = config.intake_service().unwrap();
    let app = routes::router(
        service,
        config.max_upload_bytes,
        config.local_storage_dir().map(|dir| dir.as_path()),
    );

    let mut parts = valid_fields();
    parts.push(image("fox.png", b"\x89PNG fox"));
    let response = app
        .clone()
        .oneshot(multipart_request(&parts))
        .await
        .unwrap();
    let (status, json) = common::body_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let id = Uuid::parse_str(json["id"].as_str().unwrap()).unwrap();
    let record = LocalJobStore::new(jobs_dir).load(&id).await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Running);
    assert_eq!(record.images.len(), 1);

    let public_url = &record.images[0];
    let served_path = public_url
        .strip_prefix("https://intake.example.com")
        .expect("public url uses the configured base");
    assert!(served_path.starts_with("/storage/"));
    assert!(served_path.ends_with(".png"));

    let request = Request::builder()
        .uri(served_path)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "max-age=3600"
    );
    assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"\x89PNG fox");
}

#[tokio::test]
async fn storage_route_shares_the_application_layers() {
    let root = tempfile::tempdir().unwrap();
    let vars: HashMap<&str, String> = HashMap::from([
        ("STORAGE_DIR", root.path().join("storage").display().to_string()),
        ("JOBS_DIR", root.path().join("jobs").display().to_string()),
    ]);
    let config = AppConfig::from_lookup(|var| vars.get(var).cloned()).unwrap();
    let app = routes::router(
        config.intake_service().unwrap(),
        config.max_upload_bytes,
        config.local_storage_dir().map(|dir| dir.as_path()),
    );

    let missing = Request::builder()
        .uri("/storage/1700000000000-abcdef.png")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(missing).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(health).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
