//! Shared test helpers, available to all `#[cfg(test)]` modules in the crate.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tempfile::TempDir;

use crate::config::{Config, ServerConfig, StorageConfig, TokenConfig, UserEntry};
use crate::storage::models::{NewBook, SessionToken};
use crate::storage::Database;
use crate::AppState;

/// Open a fresh database in a temporary directory.
///
/// Returns both the `Database` and the `TempDir` guard; the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

/// A minimal `Config` suitable for unit tests (memory backend, no users file).
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:8080".to_string(),
        },
        storage: StorageConfig {
            data_dir: "/tmp/test".to_string(),
            users_file: PathBuf::from("/nonexistent/users.yaml"),
            ..StorageConfig::default()
        },
        tokens: TokenConfig::default(),
    }
}

/// Two plaintext users, as a users file would list them
pub fn seed_entries() -> Vec<UserEntry> {
    [("admin", "admin123"), ("user1", "password1")]
        .into_iter()
        .map(|(username, password)| UserEntry {
            password: password.to_string(),
            username: username.to_string(),
        })
        .collect()
}

/// Memory-backed `AppState` knowing the [`seed_entries`] users.
pub fn memory_state() -> Arc<AppState> {
    Arc::new(AppState::in_memory(test_config(), &seed_entries()).unwrap())
}

/// Durable `AppState` around the given database, seeded with [`seed_entries`].
pub fn durable_state(db: Database) -> Arc<AppState> {
    Arc::new(AppState::durable(test_config(), db, &seed_entries()).unwrap())
}

/// Book input with the given title and ISBN.
pub fn new_book(title: &str, isbn: &str) -> NewBook {
    NewBook {
        author: "Steve Klabnik".to_string(),
        isbn: isbn.to_string(),
        published_at: NaiveDate::from_ymd_opt(2019, 8, 12),
        title: title.to_string(),
    }
}

/// Create a `SessionToken` owned by `username` that expires after `ttl`.
pub fn make_session(id: &str, username: &str, ttl: Duration) -> SessionToken {
    let now = Utc::now();
    SessionToken {
        expires_at: now + ttl,
        issued_at: now,
        token: format!("tok_{id}"),
        username: username.to_string(),
    }
}
