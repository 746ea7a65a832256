use std::any::Any;
use std::path::Path;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    http::{HeaderValue, header},
    response::Response,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{
    catch_panic::CatchPanicLayer, services::ServeDir, set_header::SetResponseHeader,
    trace::TraceLayer,
};

use crate::config::LOCAL_STORAGE_ROUTE;
use crate::error::{IntakeError, internal_error_response};
use crate::intake::{IntakeForm, IntakeService};
use crate::model::JobId;
use crate::storage::ASSET_CACHE_CONTROL;

pub const GENERATE_IMAGE_ROUTE: &str = "/api/generate-image";

#[derive(Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: JobId,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn generate_image(
    State(service): State<IntakeService>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CreatedResponse>, IntakeError> {
    let multipart = multipart.map_err(|rejection| IntakeError::Internal(rejection.body_text()))?;
    let form = IntakeForm::from_multipart(multipart).await?;
    let job = service.submit(form).await?;
    Ok(Json(CreatedResponse {
        success: true,
        id: job.id,
    }))
}

fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    internal_error_response()
}

/// Build the application. With `local_storage`, objects in that directory are
/// published under [`LOCAL_STORAGE_ROUTE`] so the URLs handed to the worker resolve.
pub fn router(
    service: IntakeService,
    max_upload_bytes: usize,
    local_storage: Option<&Path>,
) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route(
            GENERATE_IMAGE_ROUTE,
            post(generate_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        );
    if let Some(dir) = local_storage {
        let files = SetResponseHeader::if_not_present(
            ServeDir::new(dir),
            header::CACHE_CONTROL,
            HeaderValue::from_static(ASSET_CACHE_CONTROL),
        );
        router = router.nest_service(LOCAL_STORAGE_ROUTE, files);
    }
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
