use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{BookError, BookStore};
use crate::storage::models::{Book, BookPatch, NewBook};

#[derive(Default)]
struct Shelf {
    /// Keyed by id so iteration is ascending
    books: BTreeMap<u64, Book>,
    isbns: HashMap<String, u64>,
    last_id: u64,
}

/// Volatile book store. State is lost on restart.
///
/// One `RwLock` guards the whole shelf: reads run concurrently, writes are
/// exclusive with everything else on this store.
#[derive(Default)]
pub struct MemoryBookStore {
    shelf: RwLock<Shelf>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, book: NewBook) -> Result<Book, BookError> {
        let mut shelf = self.shelf.write().await;
        if shelf.isbns.contains_key(&book.isbn) {
            return Err(BookError::DuplicateIsbn(book.isbn));
        }

        shelf.last_id += 1;
        let book = book.into_book(shelf.last_id, Utc::now());
        shelf.isbns.insert(book.isbn.clone(), book.id);
        shelf.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get_by_id(&self, id: u64) -> Result<Book, BookError> {
        let shelf = self.shelf.read().await;
        shelf.books.get(&id).cloned().ok_or(BookError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<Book>, BookError> {
        let shelf = self.shelf.read().await;
        Ok(shelf.books.values().cloned().collect())
    }

    async fn update(&self, id: u64, patch: BookPatch) -> Result<Book, BookError> {
        let mut shelf = self.shelf.write().await;
        let old_isbn = match shelf.books.get(&id) {
            Some(book) => book.isbn.clone(),
            None => return Err(BookError::NotFound),
        };

        if let Some(isbn) = &patch.isbn {
            if shelf.isbns.get(isbn).is_some_and(|owner| *owner != id) {
                return Err(BookError::DuplicateIsbn(isbn.clone()));
            }
        }

        let Shelf { books, isbns, .. } = &mut *shelf;
        let book = books.get_mut(&id).ok_or(BookError::NotFound)?;
        patch.apply(book, Utc::now());
        if book.isbn != old_isbn {
            isbns.remove(&old_isbn);
            isbns.insert(book.isbn.clone(), id);
        }
        Ok(book.clone())
    }

    async fn delete(&self, id: u64) -> Result<(), BookError> {
        let mut shelf = self.shelf.write().await;
        let book = shelf.books.remove(&id).ok_or(BookError::NotFound)?;
        shelf.isbns.remove(&book.isbn);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), BookError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
