use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result as ServiceResult};
use crate::types::{Page, PageRequest};

/// Standard API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub code: String,
    pub success: bool,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    #[must_use]
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            message: message.into(),
            code: status.as_u16().to_string(),
            success: status.is_success(),
            data,
        }
    }
}

impl ApiResponse<()> {
    /// A success envelope without a payload.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message, None)
    }
}

/// Aggregates for list endpoints that report none.
#[derive(Debug, Default, Serialize)]
pub struct NoAggregates {}

/// Envelope for list endpoints. Endpoint-specific totals are flattened next
/// to the paging fields.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize, A: Serialize = NoAggregates> {
    pub message: String,
    pub code: String,
    pub success: bool,
    pub data: Vec<T>,
    pub total_count: i64,
    pub page_number: i64,
    pub page_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(flatten)]
    pub aggregates: A,
}

impl<T: Serialize> PaginatedResponse<T> {
    #[must_use]
    pub fn new(message: impl Into<String>, page: Page<T>, request: PageRequest) -> Self {
        Self::with_aggregates(message, page, request, NoAggregates::default())
    }
}

impl<T: Serialize, A: Serialize> PaginatedResponse<T, A> {
    #[must_use]
    pub fn with_aggregates(
        message: impl Into<String>,
        page: Page<T>,
        request: PageRequest,
        aggregates: A,
    ) -> Self {
        Self {
            message: message.into(),
            code: StatusCode::OK.as_u16().to_string(),
            success: true,
            next_page_token: request.next_page_token(page.total),
            data: page.items,
            total_count: page.total,
            page_number: request.number,
            page_size: request.size,
            aggregates,
        }
    }
}

/// API error that converts to an error envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Maps a service error, prefixing `context` onto failures that are not
    /// the caller's fault.
    #[must_use]
    pub fn from_error(err: Error, context: &str) -> Self {
        match err {
            Error::NotFound(m) => Self::not_found(m),
            Error::AlreadyExists(m) => Self {
                status: StatusCode::CONFLICT,
                message: m,
            },
            Error::InvalidArgument(m) => Self::bad_request(m),
            Error::Unauthenticated(m) => Self::unauthorized(m),
            Error::Upstream(m) => Self::bad_gateway(format!("{context}: {m}")),
            err if err.is_foreign_key_violation() => {
                Self::bad_request(format!("{context}: referenced record does not exist"))
            }
            err => {
                tracing::error!("{context}: {err}");
                Self::internal(format!("{context}: {err}"))
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::from_error(err, "Request failed")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "message": self.message,
            "code": self.status.as_u16().to_string(),
            "success": false,
            "data": null,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Extension trait for converting service results to API errors with the
/// operation that failed.
pub trait ServiceResultExt<T> {
    fn api_err(self, context: &str) -> Result<T, ApiError>;
}

impl<T> ServiceResultExt<T> for ServiceResult<T> {
    fn api_err(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_error(e, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Totals {
        total_late: i64,
    }

    #[test]
    fn test_error_mapping() {
        let cases = [
            (Error::not_found("x"), StatusCode::NOT_FOUND),
            (Error::AlreadyExists("x".into()), StatusCode::CONFLICT),
            (Error::invalid("x"), StatusCode::BAD_REQUEST),
            (Error::unauthenticated("x"), StatusCode::UNAUTHORIZED),
            (Error::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from_error(err, "Failed").status, status);
        }
    }

    #[test]
    fn test_internal_message_keeps_cause() {
        let err = ApiError::from_error(Error::Internal("disk full".into()), "Failed to create asset");
        assert_eq!(err.message, "Failed to create asset: disk full");
    }

    #[test]
    fn test_paginated_envelope_shape() {
        let page = Page {
            items: vec![1, 2],
            total: 12,
        };
        let request = PageRequest { number: 1, size: 2 };
        let body = PaginatedResponse::with_aggregates("ok", page, request, Totals { total_late: 3 });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["code"], "200");
        assert_eq!(json["success"], true);
        assert_eq!(json["total_count"], 12);
        assert_eq!(json["next_page_token"], "page_token_2");
        assert_eq!(json["total_late"], 3);
    }

    #[test]
    fn test_created_envelope() {
        let json = serde_json::to_value(ApiResponse::created("made", 5)).unwrap();
        assert_eq!(json["code"], "201");
        assert_eq!(json["data"], 5);
    }
}
