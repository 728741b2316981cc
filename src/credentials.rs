//! Who may log in.
//!
//! Two variants: a static list built from the users file (linear scan) and
//! the durable `users` table (indexed by username).

use async_trait::async_trait;
use thiserror::Error;

use crate::config::UserEntry;
use crate::storage::models::Credential;
use crate::tokens::password::{burn_verification, hash_password, verify_password};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Database error: {0}")]
    Database(#[from] crate::storage::DatabaseError),
    #[error("Failed to hash password: {0}")]
    Hashing(#[from] rand::Error),
    #[error("Password verification task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find(&self, username: &str) -> Result<Option<Credential>, CredentialError>;
}

/// Check a username/password pair.
///
/// Unknown users cost the same hashing work as a wrong password. The hashing
/// itself runs on the blocking pool.
pub async fn authenticate(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<bool, CredentialError> {
    let credential = store.find(username).await?;
    let password = password.to_string();

    let verified = tokio::task::spawn_blocking(move || match credential {
        Some(credential) => verify_password(&password, &credential.secret_hash),
        None => {
            burn_verification(&password);
            false
        }
    })
    .await?;
    Ok(verified)
}

/// Hash plaintext entries from the users file into credentials
pub fn hash_entries(entries: &[UserEntry]) -> Result<Vec<Credential>, CredentialError> {
    entries
        .iter()
        .map(|entry| {
            Ok(Credential {
                secret_hash: hash_password(&entry.password)?,
                username: entry.username.clone(),
            })
        })
        .collect()
}

/// Fixed set of users loaded once at startup
pub struct StaticCredentials {
    users: Vec<Credential>,
}

impl StaticCredentials {
    pub fn new(users: Vec<Credential>) -> Self {
        Self { users }
    }

    pub fn from_entries(entries: &[UserEntry]) -> Result<Self, CredentialError> {
        Ok(Self::new(hash_entries(entries)?))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for StaticCredentials {
    async fn find(&self, username: &str) -> Result<Option<Credential>, CredentialError> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }
}
