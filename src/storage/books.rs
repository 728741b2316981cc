use async_trait::async_trait;
use chrono::Utc;
use redb::{ReadableTable, WriteTransaction};

use super::db::{Database, DatabaseError};
use super::models::{Book, BookPatch, NewBook};
use super::tables::*;
use crate::books::{BookError, BookStore};

/// Result of a book write that ran to completion
#[derive(Debug)]
pub enum BookWrite {
    /// The ISBN already belongs to another book; nothing was written
    IsbnTaken(String),
    NotFound,
    Written(Book),
}

impl BookWrite {
    fn into_result(self) -> Result<Book, BookError> {
        match self {
            BookWrite::IsbnTaken(isbn) => Err(BookError::DuplicateIsbn(isbn)),
            BookWrite::NotFound => Err(BookError::NotFound),
            BookWrite::Written(book) => Ok(book),
        }
    }
}

/// Commit on success, otherwise leave the database untouched.
fn finish(write_txn: WriteTransaction, outcome: &BookWrite) -> Result<(), DatabaseError> {
    match outcome {
        BookWrite::Written(_) => write_txn.commit()?,
        _ => write_txn.abort()?,
    }
    Ok(())
}

impl Database {
    // ========================================================================
    // Book operations
    // ========================================================================

    /// Store a new book under the next id of the persisted sequence
    pub fn insert_book(&self, book: NewBook) -> Result<BookWrite, DatabaseError> {
        let write_txn = self.begin_write()?;
        let outcome = {
            let mut isbns = write_txn.open_table(BOOK_ISBNS)?;
            let taken = isbns.get(book.isbn.as_str())?.is_some();

            if taken {
                BookWrite::IsbnTaken(book.isbn)
            } else {
                // Sequence lives in its own row so deleted ids are never handed out again
                let mut meta = write_txn.open_table(META)?;
                let last_id = meta.get(BOOK_SEQUENCE)?.map(|v| v.value()).unwrap_or(0);
                let id = last_id + 1;
                meta.insert(BOOK_SEQUENCE, id)?;

                let book = book.into_book(id, Utc::now());
                let data = rmp_serde::to_vec_named(&book)?;
                let mut books = write_txn.open_table(BOOKS)?;
                books.insert(id, data.as_slice())?;
                isbns.insert(book.isbn.as_str(), id)?;
                BookWrite::Written(book)
            }
        };

        finish(write_txn, &outcome)?;
        Ok(outcome)
    }

    /// Get a book by id
    pub fn get_book(&self, id: u64) -> Result<Option<Book>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;

        let book = table
            .get(id)?
            .map(|data| rmp_serde::from_slice::<Book>(data.value()))
            .transpose()?;
        Ok(book)
    }

    /// Get all books in ascending id order
    pub fn list_books(&self) -> Result<Vec<Book>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;

        let mut books = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let book: Book = rmp_serde::from_slice(value.value())?;
            books.push(book);
        }

        Ok(books)
    }

    /// Apply a partial update, keeping the ISBN index in step
    pub fn update_book(&self, id: u64, patch: BookPatch) -> Result<BookWrite, DatabaseError> {
        let write_txn = self.begin_write()?;
        let outcome = {
            let mut books = write_txn.open_table(BOOKS)?;
            let existing = books
                .get(id)?
                .map(|data| rmp_serde::from_slice::<Book>(data.value()))
                .transpose()?;

            match existing {
                None => BookWrite::NotFound,
                Some(mut book) => {
                    let mut isbns = write_txn.open_table(BOOK_ISBNS)?;
                    let taken_by_other = match patch.isbn.as_deref() {
                        Some(isbn) => isbns
                            .get(isbn)?
                            .is_some_and(|owner| owner.value() != id)
                            .then(|| isbn.to_string()),
                        None => None,
                    };

                    if let Some(isbn) = taken_by_other {
                        BookWrite::IsbnTaken(isbn)
                    } else {
                        let old_isbn = book.isbn.clone();
                        patch.apply(&mut book, Utc::now());
                        if book.isbn != old_isbn {
                            isbns.remove(old_isbn.as_str())?;
                            isbns.insert(book.isbn.as_str(), id)?;
                        }

                        let data = rmp_serde::to_vec_named(&book)?;
                        books.insert(id, data.as_slice())?;
                        BookWrite::Written(book)
                    }
                }
            }
        };

        finish(write_txn, &outcome)?;
        Ok(outcome)
    }

    /// Delete a book and release its ISBN
    pub fn delete_book(&self, id: u64) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let deleted = {
            let mut books = write_txn.open_table(BOOKS)?;
            let removed = books
                .remove(id)?
                .map(|data| rmp_serde::from_slice::<Book>(data.value()))
                .transpose()?;

            match removed {
                Some(book) => {
                    let mut isbns = write_txn.open_table(BOOK_ISBNS)?;
                    isbns.remove(book.isbn.as_str())?;
                    true
                }
                None => false,
            }
        };

        if deleted {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(deleted)
    }
}

#[async_trait]
impl BookStore for Database {
    async fn create(&self, book: NewBook) -> Result<Book, BookError> {
        let book = self.insert_book(book)?.into_result()?;
        tracing::debug!(id = book.id, isbn = %book.isbn, "Created book");
        Ok(book)
    }

    async fn get_by_id(&self, id: u64) -> Result<Book, BookError> {
        self.get_book(id)?.ok_or(BookError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<Book>, BookError> {
        Ok(self.list_books()?)
    }

    async fn update(&self, id: u64, patch: BookPatch) -> Result<Book, BookError> {
        self.update_book(id, patch)?.into_result()
    }

    async fn delete(&self, id: u64) -> Result<(), BookError> {
        if self.delete_book(id)? {
            tracing::debug!(id, "Deleted book");
            Ok(())
        } else {
            Err(BookError::NotFound)
        }
    }

    async fn health_check(&self) -> Result<(), BookError> {
        Ok(self.ping()?)
    }

    fn backend_name(&self) -> &'static str {
        "durable"
    }
}
