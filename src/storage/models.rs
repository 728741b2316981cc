use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub author: String,
    /// When the book was first stored
    pub created_at: DateTime<Utc>,
    /// Store-assigned identifier, never reused
    pub id: u64,
    /// Unique across the store
    pub isbn: String,
    pub published_at: Option<NaiveDate>,
    pub title: String,
    /// Refreshed on every update
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields of a book that is about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub author: String,
    pub isbn: String,
    pub published_at: Option<NaiveDate>,
    pub title: String,
}

impl NewBook {
    /// Stamp server-assigned fields onto the new record.
    pub fn into_book(self, id: u64, now: DateTime<Utc>) -> Book {
        Book {
            author: self.author,
            created_at: now,
            id,
            isbn: self.isbn,
            published_at: self.published_at,
            title: self.title,
            updated_at: now,
        }
    }
}

/// Partial update: `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub published_at: Option<NaiveDate>,
    pub title: Option<String>,
}

impl BookPatch {
    /// Overwrite the supplied fields and refresh `updated_at`.
    pub fn apply(self, book: &mut Book, now: DateTime<Utc>) {
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if let Some(published_at) = self.published_at {
            book.published_at = Some(published_at);
        }
        if let Some(title) = self.title {
            book.title = title;
        }
        book.updated_at = now;
    }
}

/// An issued login session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Lookups at or after this instant treat the token as gone
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    /// Opaque secret (16 random bytes, hex encoded)
    pub token: String,
    /// The principal the token was issued to
    pub username: String,
}

impl SessionToken {
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// A user allowed to log in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// `<salt>$<digest>`, see [`crate::tokens::password`]
    pub secret_hash: String,
    pub username: String,
}
