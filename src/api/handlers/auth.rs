use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::middleware::bearer_token;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::credentials::authenticate;
use crate::tokens::{session, SessionError};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub expires_at: String,
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<JSend<LoginResponse>>, ApiError> {
    validate_login(&req)?;

    let accepted = authenticate(state.credentials.as_ref(), &req.username, &req.password)
        .await
        .map_err(|e| ApiError::internal("Failed to verify credentials", e))?;
    if !accepted {
        tracing::info!(username = %req.username, "Rejected login");
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let session = session::issue(state.tokens.as_ref(), &req.username)
        .await
        .map_err(|e| match e {
            SessionError::Generation(_) => ApiError::internal("Failed to generate token", e),
            SessionError::Database(_) => ApiError::internal("Failed to store token", e),
            SessionError::ExpiryOutOfRange => ApiError::internal("Failed to issue token", e),
        })?;

    tracing::info!(username = %req.username, "Login successful");
    Ok(JSend::success(LoginResponse {
        expires_at: session.expires_at.to_rfc3339(),
        message: "Login successful".to_string(),
        token: session.token,
    }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::bad_request("Authorization token is required"))?;

    let removed = state
        .tokens
        .remove(token)
        .await
        .map_err(|e| ApiError::internal("Failed to remove token", e))?;
    if !removed {
        return Err(ApiError::unauthorized("Invalid token"));
    }

    tracing::debug!("Session token removed");
    Ok(JSend::success(MessageResponse {
        message: "Logout successful".to_string(),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_login(req: &LoginRequest) -> Result<(), ApiError> {
    if req.username.is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }
    if req.password.is_empty() {
        return Err(ApiError::bad_request("password is required"));
    }
    Ok(())
}
