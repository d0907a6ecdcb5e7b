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
use crate::server::dto::{AssetStatusRequest, HashQuery};
use crate::server::response::{ApiError, ApiResponse, PaginatedResponse, ServiceResultExt};
use crate::service::{AssetQuery, CreateAsset};
use crate::types::AssetPatch;

pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(req): Json<CreateAsset>,
) -> impl IntoResponse {
    let asset = state
        .assets
        .create(req, Utc::now())
        .api_err("Failed to create asset")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::created("Successfully created asset", asset)),
    ))
}

pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Query(query): Query<AssetQuery>,
) -> impl IntoResponse {
    let (page, request) = state
        .assets
        .list(&query, &caller, Utc::now().date_naive())
        .api_err("Failed to list assets")?;

    Ok::<_, ApiError>(Json(PaginatedResponse::new(
        "Successfully retrieved assets",
        page,
        request,
    )))
}

pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let asset = state
        .assets
        .get(id, Utc::now().date_naive())
        .api_err("Failed to get asset")?;

    Ok::<_, ApiError>(Json(ApiResponse::success("Successfully retrieved asset", asset)))
}

pub async fn get_asset_by_hash(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Query(query): Query<HashQuery>,
) -> impl IntoResponse {
    let asset = state
        .assets
        .get_by_hash(&query.hash, Utc::now().date_naive())
        .api_err("Failed to get asset")?;

    Ok::<_, ApiError>(Json(ApiResponse::success("Successfully retrieved asset", asset)))
}

pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<i64>,
    Json(patch): Json<AssetPatch>,
) -> impl IntoResponse {
    let asset = state
        .assets
        .update(id, patch, Utc::now())
        .api_err("Failed to update asset")?;

    Ok::<_, ApiError>(Json(ApiResponse::success("Successfully updated asset", asset)))
}

pub async fn update_asset_status(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<i64>,
    Json(req): Json<AssetStatusRequest>,
) -> impl IntoResponse {
    state
        .assets
        .update_status(id, &req.asset_status, Utc::now())
        .api_err("Failed to update asset status")?;

    Ok::<_, ApiError>(Json(ApiResponse::message(
        "Successfully updated asset status",
    )))
}

pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state
        .assets
        .delete(id)
        .api_err("Failed to delete asset")?;

    Ok::<_, ApiError>(Json(ApiResponse::message("Successfully deleted asset")))
}

pub async fn list_asset_history(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let history = state
        .assets
        .history(id)
        .api_err("Failed to list asset history")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully retrieved asset history",
        history,
    )))
}
