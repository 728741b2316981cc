mod auth;
mod books;
mod health;

use crate::api::response::ApiError;
use crate::books::BookError;

pub use auth::*;
pub use books::*;
pub use health::*;

/// Map a repository error to its response; `context` is the 500 message.
pub(crate) fn book_error(err: BookError, context: &str) -> ApiError {
    match err {
        BookError::NotFound => ApiError::not_found("Book not found"),
        BookError::DuplicateIsbn(isbn) => {
            ApiError::conflict(format!("A book with ISBN {isbn} already exists"))
        }
        BookError::Database(e) => ApiError::internal(context, e),
    }
}

/// Fallback for a known path hit with an unsupported verb
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// Fallback for paths no route matches
pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
