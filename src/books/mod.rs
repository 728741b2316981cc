//! Book repository shared by the volatile and durable backends.
//!
//! Handlers only ever see `Arc<dyn BookStore>`; the concrete backend is picked
//! once at startup from configuration.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::models::{Book, BookPatch, NewBook};
use crate::storage::DatabaseError;

pub use memory::MemoryBookStore;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("A book with ISBN {0} already exists")]
    DuplicateIsbn(String),
    #[error("Book not found")]
    NotFound,
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Assign id and timestamps, then store. ISBNs must be unique.
    async fn create(&self, book: NewBook) -> Result<Book, BookError>;

    async fn get_by_id(&self, id: u64) -> Result<Book, BookError>;

    /// All books, ascending by id
    async fn get_all(&self) -> Result<Vec<Book>, BookError>;

    /// Overwrite only the supplied fields and refresh `updated_at`.
    async fn update(&self, id: u64, patch: BookPatch) -> Result<Book, BookError>;

    async fn delete(&self, id: u64) -> Result<(), BookError>;

    async fn health_check(&self) -> Result<(), BookError>;

    fn backend_name(&self) -> &'static str;
}
