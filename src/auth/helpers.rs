/// Routes reachable without a session token. Matched against the full path.
pub const PUBLIC_PATHS: &[&str] = &["/health", "/api/v1/auth/login"];

#[must_use]
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

#[derive(Debug, PartialEq, Eq)]
pub enum TokenExtractionError {
    Missing,
    InvalidScheme,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Result<String, TokenExtractionError> {
    match auth_header {
        Some(header) => header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or(TokenExtractionError::InvalidScheme),
        None => Err(TokenExtractionError::Missing),
    }
}
