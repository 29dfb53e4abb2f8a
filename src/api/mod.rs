//! API handlers for Bookshelf REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, Request},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;

use crate::{error::AppError, AppState};

/// JSON body extractor that ignores `Content-Type` and reports
/// empty or malformed bodies as 400 with a plain-text message
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(body_rejection)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::BadRequest("empty body".to_string()));
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::BadRequest(format!("invalid JSON: {}", e)))
    }
}

fn body_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(rejection.body_text())
    } else {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Create the application router with all routes.
///
/// No CORS layer: it would answer every `OPTIONS` itself, while `/api/books`
/// must reply 405 to anything but GET and POST.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/books",
            get(books::list_books)
                .post(books::create_book)
                // get() would otherwise serve HEAD too
                .head(books::method_not_allowed)
                .fallback(books::method_not_allowed),
        )
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
}
