use chrono::Duration;
use redb::{Database as RedbDatabase, ReadTransaction, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::tables::*;

/// File name of the database inside the data directory
pub const DB_FILE: &str = "book-api.redb";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("Deserialization error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("Serialization error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),
    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
}

/// Durable backend for books, sessions and users.
///
/// Cheap to clone; clones share the same underlying redb handle. Every store
/// operation runs in a single redb transaction, so consistency relies on
/// redb's single-writer / MVCC-reader model rather than in-process locks.
#[derive(Clone)]
pub struct Database {
    db: Arc<RedbDatabase>,
    pub(super) session_ttl: Duration,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join(DB_FILE);
        let db = RedbDatabase::create(db_path)?;

        // Create tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BOOKS)?;
            let _ = write_txn.open_table(BOOK_ISBNS)?;
            let _ = write_txn.open_table(META)?;
            let _ = write_txn.open_table(SESSIONS)?;
            let _ = write_txn.open_table(USERS)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(db),
            session_ttl: Duration::hours(24),
        })
    }

    /// Lifetime given to sessions stored from now on
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, DatabaseError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, DatabaseError> {
        Ok(self.db.begin_write()?)
    }

    /// Connectivity probe: opens a read transaction and touches the books table
    pub fn ping(&self) -> Result<(), DatabaseError> {
        let read_txn = self.begin_read()?;
        let _ = read_txn.open_table(BOOKS)?;
        Ok(())
    }
}
