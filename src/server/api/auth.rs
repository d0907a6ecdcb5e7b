use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::auth::BearerToken;
use crate::server::AppState;
use crate::server::dto::{LoginRequest, LogoutRequest, ResetPasswordRequest};
use crate::server::response::{ApiError, ApiResponse, ServiceResultExt};

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let outcome = state
        .auth
        .login(&req.nip, &req.password, Utc::now())
        .api_err("Failed to log in")?;

    Ok::<_, ApiError>(Json(ApiResponse::success("Login successful", outcome)))
}

/// Revokes the token in the body, or the caller's own token when the body
/// names none.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    BearerToken(bearer): BearerToken,
    body: Option<Json<LogoutRequest>>,
) -> impl IntoResponse {
    let token = body
        .and_then(|Json(req)| req.token)
        .filter(|t| !t.is_empty())
        .unwrap_or(bearer);

    state.auth.logout(&token).api_err("Failed to log out")?;

    Ok::<_, ApiError>(Json(ApiResponse::message("Logout successful")))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> impl IntoResponse {
    state
        .auth
        .reset_password(&req.nip, &req.reset_token, &req.new_password, Utc::now())
        .api_err("Failed to reset password")?;

    Ok::<_, ApiError>(Json(ApiResponse::message("Password updated")))
}
