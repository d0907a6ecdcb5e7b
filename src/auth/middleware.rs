use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use super::Caller;
use super::helpers::{TokenExtractionError, extract_token_from_header, is_public_path};
use crate::error::Error;
use crate::server::AppState;

/// The raw bearer token of an authenticated request.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken(String),
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            AuthError::InvalidScheme => (
                StatusCode::UNAUTHORIZED,
                "Invalid authorization scheme".to_string(),
            ),
            AuthError::InvalidToken(message) => (StatusCode::UNAUTHORIZED, message),
            AuthError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = json!({
            "message": message,
            "code": status.as_u16().to_string(),
            "success": false,
            "data": null,
        });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                "WWW-Authenticate",
                axum::http::HeaderValue::from_static("Bearer realm=\"assetman\""),
            );
        }

        response
    }
}

/// Rejects every request outside the public paths unless it carries a bearer
/// token that is both present in the token store and correctly signed. On
/// success the [`Caller`] and [`BearerToken`] are added to the extensions.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match extract_token_from_header(auth_header) {
        Ok(token) => token,
        Err(TokenExtractionError::Missing) => return AuthError::MissingAuth.into_response(),
        Err(TokenExtractionError::InvalidScheme) => {
            return AuthError::InvalidScheme.into_response();
        }
    };

    match state.auth.validate(&token, Utc::now()) {
        Ok(claims) => {
            request.extensions_mut().insert(Caller::from(claims));
            request.extensions_mut().insert(BearerToken(token));
            next.run(request).await
        }
        Err(Error::Unauthenticated(message)) => {
            tracing::warn!("Rejected token for {}: {message}", request.uri().path());
            AuthError::InvalidToken(message).into_response()
        }
        Err(e) => {
            tracing::error!("Token validation failed: {e}");
            AuthError::InternalError.into_response()
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}
