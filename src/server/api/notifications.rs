use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;

use crate::auth::Caller;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, PaginatedResponse, ServiceResultExt};
use crate::service::NotificationQuery;
use crate::types::Page;

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Query(query): Query<NotificationQuery>,
) -> impl IntoResponse {
    let (items, request, counts) = state
        .notifications
        .list(&query, &caller)
        .api_err("Failed to list notifications")?;

    let page = Page {
        items,
        total: counts.total(),
    };
    Ok::<_, ApiError>(Json(PaginatedResponse::with_aggregates(
        "Successfully retrieved notifications",
        page,
        request,
        counts,
    )))
}

pub async fn get_notification(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let notification = state
        .notifications
        .get(id)
        .api_err("Failed to get notification")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully retrieved notification",
        notification,
    )))
}

/// Runs the notification sweep now instead of waiting for the next tick.
pub async fn sweep_notifications(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
) -> impl IntoResponse {
    let report = state
        .notifications
        .sweep(Utc::now().date_naive())
        .await
        .api_err("Failed to insert notifications")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully refreshed notifications",
        report,
    )))
}
