use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Query, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::FileState;
use crate::server::response::{ApiError, ServiceResultExt};

const API_KEY_HEADER: &str = "x-api-key";
const MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub module: String,
}

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub code: String,
    pub success: bool,
    pub file_path: String,
}

pub async fn require_api_key(
    State(state): State<Arc<FileState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(key) = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        return ApiError::unauthorized("Missing API key").into_response();
    };

    if !state.api_keys.iter().any(|k| k == key) {
        warn!("rejected file proxy request with unknown API key");
        return ApiError::unauthorized("Invalid API key").into_response();
    }

    next.run(request).await
}

/// A single path segment: no separators, no dot segments.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

/// A relative object path made of plain segments.
fn is_relative_object_path(path: &str) -> bool {
    !path.is_empty() && path.split('/').all(is_plain_segment)
}

pub async fn upload(
    State(state): State<Arc<FileState>>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    if !is_plain_segment(&query.module) {
        return Err(ApiError::bad_request("module must be a single path segment"));
    }

    let mut file: Option<(String, Option<String>, bytes::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("File name is required"))?;
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
        if data.len() > MAX_UPLOAD_SIZE {
            return Err(ApiError::payload_too_large(format!(
                "File size ({} bytes) exceeds maximum allowed size ({MAX_UPLOAD_SIZE} bytes)",
                data.len()
            )));
        }
        file = Some((file_name, content_type, data));
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| ApiError::bad_request("File field is required"))?;
    if !is_plain_segment(&file_name) {
        return Err(ApiError::bad_request("Invalid file name"));
    }

    let file_path = format!("{}/{file_name}", query.module);
    let size = data.len();
    state
        .client
        .upload(&file_path, data, content_type.as_deref())
        .await
        .api_err("Failed to upload file")?;

    info!(file_path = %file_path, size, "uploaded file");
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            code: StatusCode::CREATED.as_u16().to_string(),
            success: true,
            file_path,
        }),
    ))
}

pub async fn get_file(
    State(state): State<Arc<FileState>>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ApiError> {
    let path = query.path.trim_start_matches('/');
    if !is_relative_object_path(path) {
        return Err(ApiError::bad_request("path must be a relative file path"));
    }

    let object = state
        .client
        .download(path)
        .await
        .api_err("Failed to fetch file")?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(length) = object.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(object.response.bytes_stream()))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {e}")))
}
