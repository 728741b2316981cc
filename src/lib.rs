//! book-api - token-authenticated book catalogue over HTTP
//!
//! This crate provides:
//! - Username/password login issuing opaque session tokens
//! - Bearer-token gate on the book routes
//! - Book CRUD with unique ISBNs
//! - Interchangeable volatile (in-memory) and durable (redb) backends
//! - Small file tools (`sort-numbers`, `char-count`) under [`tools`]

pub mod api;
pub mod books;
pub mod config;
pub mod credentials;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod tokens;
pub mod tools;

use std::sync::Arc;
use thiserror::Error;

use books::{BookStore, MemoryBookStore};
use config::{Config, ConfigError, StorageBackend, UserEntry};
use credentials::{CredentialError, CredentialStore, StaticCredentials};
use storage::{Database, DatabaseError};
use tokens::{MemoryTokenStore, TokenStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to prepare credentials: {0}")]
    Credentials(#[from] CredentialError),
    #[error("Failed to open database: {0}")]
    Database(#[from] DatabaseError),
}

/// Shared application state
pub struct AppState {
    pub books: Arc<dyn BookStore>,
    pub config: Config,
    pub credentials: Arc<dyn CredentialStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl AppState {
    /// Volatile stores; everything but the user list is lost on restart.
    pub fn in_memory(config: Config, users: &[UserEntry]) -> Result<Self, StartupError> {
        let credentials = StaticCredentials::from_entries(users)?;
        tracing::info!(users = credentials.len(), "Loaded static credentials");
        let tokens = MemoryTokenStore::new(config.tokens.session_ttl());

        Ok(Self {
            books: Arc::new(MemoryBookStore::new()),
            config,
            credentials: Arc::new(credentials),
            tokens: Arc::new(tokens),
        })
    }

    /// All three stores backed by one redb file. `users` are added if absent.
    pub fn durable(config: Config, db: Database, users: &[UserEntry]) -> Result<Self, StartupError> {
        let db = db.with_session_ttl(config.tokens.session_ttl());
        let seeded = db.seed_users(users)?;
        tracing::info!(seeded, "Seeded users into durable store");

        Ok(Self {
            books: Arc::new(db.clone()),
            config,
            credentials: Arc::new(db.clone()),
            tokens: Arc::new(db),
        })
    }

    /// Build the stores selected by `config.storage.backend`.
    pub fn from_config(config: Config) -> Result<Self, StartupError> {
        let users = config.initial_users()?;
        match config.storage.backend {
            StorageBackend::Memory => Self::in_memory(config, &users),
            StorageBackend::Durable => {
                let db = Database::open(&config.storage.data_dir)?;
                tracing::info!(data_dir = %config.storage.data_dir, "Database opened");
                Self::durable(config, db, &users)
            }
        }
    }
}
