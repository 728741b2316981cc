use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::MessageResponse;
use super::book_error;
use crate::api::middleware::Principal;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::storage::models::{Book, BookPatch, NewBook};
use crate::AppState;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateBookRequest {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub title: String,
}

/// Every field is optional; only the supplied ones are overwritten.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateBookRequest {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub author: String,
    pub created_at: String,
    pub id: u64,
    pub isbn: String,
    pub published_at: Option<String>,
    pub title: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookListResponse {
    pub books: Vec<BookResponse>,
    pub count: usize,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<BookListResponse>>, ApiError> {
    let books = state
        .books
        .get_all()
        .await
        .map_err(|e| book_error(e, "Failed to retrieve books"))?;

    let books: Vec<BookResponse> = books.iter().map(book_to_response).collect();
    Ok(JSend::success(BookListResponse {
        count: books.len(),
        books,
    }))
}

pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    AppJson(req): AppJson<CreateBookRequest>,
) -> Result<(StatusCode, Json<JSend<BookResponse>>), ApiError> {
    validate_create_book(&req)?;
    let published_at = req.published_at.as_deref().map(parse_date).transpose()?;

    let book = state
        .books
        .create(NewBook {
            author: req.author,
            isbn: req.isbn,
            published_at,
            title: req.title,
        })
        .await
        .map_err(|e| book_error(e, "Failed to create book"))?;

    tracing::info!(id = book.id, isbn = %book.isbn, username = %principal.username, "Created book");
    Ok(JSend::with_status(
        StatusCode::CREATED,
        book_to_response(&book),
    ))
}

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<BookResponse>>, ApiError> {
    let id = parse_id(&id)?;
    let book = state
        .books
        .get_by_id(id)
        .await
        .map_err(|e| book_error(e, "Failed to retrieve book"))?;
    Ok(JSend::success(book_to_response(&book)))
}

pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<AppJson<UpdateBookRequest>, ApiError>,
) -> Result<Json<JSend<BookResponse>>, ApiError> {
    let id = parse_id(&id)?;
    // An unknown id wins over a bad body
    state
        .books
        .get_by_id(id)
        .await
        .map_err(|e| book_error(e, "Failed to update book"))?;

    let AppJson(req) = body?;
    let patch = BookPatch {
        author: req.author,
        isbn: req.isbn,
        published_at: req.published_at.as_deref().map(parse_date).transpose()?,
        title: req.title,
    };

    let book = state
        .books
        .update(id, patch)
        .await
        .map_err(|e| book_error(e, "Failed to update book"))?;

    tracing::info!(id, username = %principal.username, "Updated book");
    Ok(JSend::success(book_to_response(&book)))
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    let id = parse_id(&id)?;
    state
        .books
        .delete(id)
        .await
        .map_err(|e| book_error(e, "Failed to delete book"))?;

    tracing::info!(id, username = %principal.username, "Deleted book");
    Ok(JSend::success(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_create_book(req: &CreateBookRequest) -> Result<(), ApiError> {
    if req.title.is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    if req.author.is_empty() {
        return Err(ApiError::bad_request("author is required"));
    }
    if req.isbn.is_empty() {
        return Err(ApiError::bad_request("isbn is required"));
    }
    Ok(())
}

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid book ID"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ApiError::bad_request("Invalid published_at format. Use YYYY-MM-DD"))
}

fn book_to_response(book: &Book) -> BookResponse {
    BookResponse {
        author: book.author.clone(),
        created_at: book.created_at.to_rfc3339(),
        id: book.id,
        isbn: book.isbn.clone(),
        published_at: book.published_at.map(|d| d.format(DATE_FORMAT).to_string()),
        title: book.title.clone(),
        updated_at: book.updated_at.to_rfc3339(),
    }
}
