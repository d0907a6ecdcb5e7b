use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::Caller;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, PaginatedResponse, ServiceResultExt};
use crate::service::{CreateUser, UserPatch, UserQuery};

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(req): Json<CreateUser>,
) -> impl IntoResponse {
    let user = state.users.create(req).api_err("Failed to create user")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::created("Successfully created user", user)),
    ))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    let (page, request) = state.users.list(&query).api_err("Failed to list users")?;

    Ok::<_, ApiError>(Json(PaginatedResponse::new(
        "Successfully retrieved users",
        page,
        request,
    )))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(nip): Path<String>,
) -> impl IntoResponse {
    let user = state.users.get(&nip).api_err("Failed to get user")?;

    Ok::<_, ApiError>(Json(ApiResponse::success("Successfully retrieved user", user)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(nip): Path<String>,
    Json(patch): Json<UserPatch>,
) -> impl IntoResponse {
    let user = state
        .users
        .update(&nip, patch)
        .api_err("Failed to update user")?;

    Ok::<_, ApiError>(Json(ApiResponse::success("Successfully updated user", user)))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(nip): Path<String>,
) -> impl IntoResponse {
    state.users.delete(&nip).api_err("Failed to delete user")?;

    Ok::<_, ApiError>(Json(ApiResponse::message("Successfully deleted user")))
}
