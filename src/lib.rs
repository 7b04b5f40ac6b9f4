pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;

use crate::api::middleware::request_id::{REQUEST_ID_HEADER, request_id_middleware};
use crate::services::parallel_upload::ParallelUploader;
use crate::services::storage::StorageService;
use axum::{
    Json, Router,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::upload_large_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::upload::UploadRequest,
            api::handlers::upload::UploadResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "upload", description = "Parallel chunked upload"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    pub uploader: Arc<ParallelUploader>,
}

impl AppState {
    pub fn new(storage: Arc<dyn StorageService>, config: &config::UploadConfig) -> Self {
        let uploader = Arc::new(ParallelUploader::new(storage.clone(), config));
        Self { storage, uploader }
    }
}

pub fn create_app(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    // The request id layer wraps the trace layer so the span sees the final id.
    Router::new()
        .route("/", post(api::handlers::upload::upload_large_file))
        .route("/upload", post(api::handlers::upload::upload_large_file))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(trace_layer)
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
