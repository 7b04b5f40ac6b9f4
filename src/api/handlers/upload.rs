use crate::AppState;
use crate::api::error::AppError;
use axum::{Json, extract::State};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use utoipa::ToSchema;

pub const MISSING_FILE_PATH: &str = "'file_path' is a required parameter.";

#[derive(Deserialize, ToSchema)]
pub struct UploadRequest {
    /// Path of the local file to upload
    pub file_path: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub bucket: String,
    /// Object names written for this file, in chunk order
    pub parts: Vec<String>,
}

/// Extracts `file_path` from a raw request body.
///
/// Anything that is not a JSON object carrying a string `file_path` counts as
/// a missing parameter.
pub fn parse_file_path(body: &[u8]) -> Result<String, AppError> {
    serde_json::from_slice::<UploadRequest>(body)
        .ok()
        .and_then(|req| req.file_path)
        .ok_or_else(|| AppError::BadRequest(MISSING_FILE_PATH.to_string()))
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "File uploaded in parallel", body = UploadResponse),
        (status = 400, description = "Missing file_path"),
        (status = 404, description = "File not found")
    ),
    tag = "upload"
)]
pub async fn upload_large_file(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    let file_path = parse_file_path(&body)?;

    info!("📤 Parallel upload requested for {}", file_path);
    let report = state.uploader.upload(&PathBuf::from(&file_path)).await?;

    Ok(Json(UploadResponse {
        message: format!(
            "File {} uploaded in parallel to {}",
            file_path, report.bucket
        ),
        bucket: report.bucket.clone(),
        parts: report.part_names(),
    }))
}
