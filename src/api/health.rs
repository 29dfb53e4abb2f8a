//! Health check endpoint, backed by a read of the book store

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" when the book store answered, "unhealthy" otherwise
    pub status: String,
    pub version: String,
    /// Number of stored books, absent when storage failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books: Option<usize>,
}

/// Health check endpoint (lists the book store)
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Book store is reachable", body = HealthResponse),
        (status = 503, description = "Book store failed", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, books) = match state.services.books.list_books().await {
        Ok(books) => (StatusCode::OK, "healthy", Some(books.len())),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", None)
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            books,
        }),
    )
}
