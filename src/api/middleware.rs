//! Bearer-token gate for protected routes
//!
//! Resolves the `Authorization` header against the token store and, when the
//! token is live, attaches the owner as a [`Principal`] request extension so
//! downstream handlers can see who is calling.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::response::ApiError;
use crate::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity resolved from a valid session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

/// Raw token from the `Authorization` header, with an optional `Bearer ` prefix
/// removed. `None` when the header is missing, empty or not valid UTF-8.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    if value.is_empty() {
        return None;
    }
    Some(value.strip_prefix(BEARER_PREFIX).unwrap_or(value))
}

/// Middleware that rejects requests without a live session token.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Authorization token is required"))?
        .to_string();

    let username = state
        .tokens
        .validate(&token)
        .await
        .map_err(|e| ApiError::internal("Failed to validate token", e))?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    request.extensions_mut().insert(Principal { username });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_prefix_is_optional() {
        assert_eq!(bearer_token(&headers_with("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers_with("abc123")), Some("abc123"));
    }

    #[test]
    fn test_missing_or_empty_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("")), None);
    }

    #[test]
    fn test_prefix_only_yields_empty_token() {
        // Validates as unknown rather than being treated as missing
        assert_eq!(bearer_token(&headers_with("Bearer ")), Some(""));
    }
}
