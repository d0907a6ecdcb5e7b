use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::auth::Caller;
use crate::server::AppState;
use crate::server::dto::{SubmissionParentCreated, SubmissionStatusRequest};
use crate::server::response::{ApiError, ApiResponse, PaginatedResponse, ServiceResultExt};
use crate::service::{
    CreateSubmission, CreateSubmissionParent, SubmissionParentQuery, SubmissionQuery,
};

pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(req): Json<CreateSubmission>,
) -> impl IntoResponse {
    let submission = state
        .submissions
        .create(req, &caller, Utc::now())
        .api_err("Failed to create submission")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "Successfully created submission",
            submission,
        )),
    ))
}

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Query(query): Query<SubmissionQuery>,
) -> impl IntoResponse {
    let (page, request, counts) = state
        .submissions
        .list(&query, &caller)
        .api_err("Failed to list submissions")?;

    Ok::<_, ApiError>(Json(PaginatedResponse::with_aggregates(
        "Successfully retrieved submissions",
        page,
        request,
        counts,
    )))
}

pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let submission = state
        .submissions
        .get(id)
        .api_err("Failed to get submission")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully retrieved submission",
        submission,
    )))
}

pub async fn update_submission_status(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(req): Json<SubmissionStatusRequest>,
) -> impl IntoResponse {
    let submission = state
        .submissions
        .update_status(id, &req.submission_status, &caller, Utc::now())
        .api_err("Failed to update submission status")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully updated submission status",
        submission,
    )))
}

pub async fn create_submission_parent(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(req): Json<CreateSubmissionParent>,
) -> impl IntoResponse {
    let submission_parent_id = state
        .submissions
        .create_parent(req, &caller, Utc::now())
        .api_err("Failed to create submission parent")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "Successfully created submission parent",
            SubmissionParentCreated {
                submission_parent_id,
            },
        )),
    ))
}

pub async fn list_submission_parents(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Query(query): Query<SubmissionParentQuery>,
) -> impl IntoResponse {
    let (page, request) = state
        .submissions
        .list_parents(&query, &caller)
        .api_err("Failed to list submission parents")?;

    Ok::<_, ApiError>(Json(PaginatedResponse::new(
        "Successfully retrieved submission parents",
        page,
        request,
    )))
}
