//! Book endpoints

use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{Book, NewBook},
    AppState,
};

use super::JsonBody;

/// List all books
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    responses(
        (status = 200, description = "All books, ascending by id", body = Vec<Book>),
        (status = 500, description = "Storage failure", body = String, content_type = "text/plain")
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list_books().await?;
    Ok(Json(books))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = Book,
            headers(("Location" = String, description = "URL of the new book"))),
        (status = 400, description = "Empty body, malformed JSON or blank name/author",
            body = String, content_type = "text/plain"),
        (status = 500, description = "Storage failure", body = String, content_type = "text/plain")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    JsonBody(data): JsonBody<NewBook>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<Book>)> {
    let book = state
        .services
        .books
        .create_book(&data.name, &data.author, data.finished)
        .await?;

    let location = format!("/api/books/{}", book.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(book)))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
