use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{JSend, JSendStatus};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub backend: String,
    pub database: String,
    pub status: String,
}

/// 200 while the book backend answers, 503 otherwise
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let backend = state.books.backend_name().to_string();

    match state.books.health_check().await {
        Ok(()) => JSend::success(HealthResponse {
            backend,
            database: "connected".to_string(),
            status: "healthy".to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, backend = %backend, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(JSend {
                    data: HealthResponse {
                        backend,
                        database: "disconnected".to_string(),
                        status: "unhealthy".to_string(),
                    },
                    status: JSendStatus::Error,
                }),
            )
                .into_response()
        }
    }
}
