use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::storage::models::SessionToken;

use super::generator::generate_token;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Database error: {0}")]
    Database(#[from] crate::storage::DatabaseError),
    #[error("Session expiry is out of range")]
    ExpiryOutOfRange,
    #[error("Failed to generate token: {0}")]
    Generation(#[from] rand::Error),
}

/// Token -> principal mapping with a fixed lifetime per token.
///
/// Both backends apply the same rule: a token is valid only while it exists
/// and `now < expires_at`. An expired token met during lookup is deleted on
/// the spot; there is no background sweep.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// New opaque token value. Not checked against existing tokens.
    fn generate_token(&self) -> Result<String, SessionError> {
        Ok(generate_token()?)
    }

    /// Associate `token` with `username`, expiring one TTL from now
    async fn store(&self, token: &str, username: &str) -> Result<SessionToken, SessionError>;

    /// Owner of a live token, or `None` if absent or expired
    async fn validate(&self, token: &str) -> Result<Option<String>, SessionError>;

    /// Delete the token; `false` if there was nothing to delete
    async fn remove(&self, token: &str) -> Result<bool, SessionError>;
}

/// Generate and store a token for `username`
pub async fn issue(store: &dyn TokenStore, username: &str) -> Result<SessionToken, SessionError> {
    let token = store.generate_token()?;
    let session = store.store(&token, username).await?;
    tracing::debug!(username = %username, expires_at = %session.expires_at, "Issued session token");
    Ok(session)
}

/// Build a session record expiring `ttl` after now
pub fn new_session(token: &str, username: &str, ttl: Duration) -> Result<SessionToken, SessionError> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or(SessionError::ExpiryOutOfRange)?;
    Ok(SessionToken {
        expires_at,
        issued_at: now,
        token: token.to_string(),
        username: username.to_string(),
    })
}

/// Volatile token store. Tokens are lost on restart.
pub struct MemoryTokenStore {
    sessions: RwLock<HashMap<String, SessionToken>>,
    ttl: Duration,
}

impl MemoryTokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn store(&self, token: &str, username: &str) -> Result<SessionToken, SessionError> {
        let session = new_session(token, username, self.ttl)?;
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn validate(&self, token: &str) -> Result<Option<String>, SessionError> {
        let now = Utc::now();
        let expired = {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(session) if session.is_live_at(now) => {
                    return Ok(Some(session.username.clone()));
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            let mut sessions = self.sessions.write().await;
            // Re-check under the write lock; the entry may already be gone
            if sessions.get(token).is_some_and(|s| !s.is_live_at(now)) {
                sessions.remove(token);
                tracing::debug!("Session token expired");
            }
        }
        Ok(None)
    }

    async fn remove(&self, token: &str) -> Result<bool, SessionError> {
        let removed = self.sessions.write().await.remove(token).is_some();
        if removed {
            tracing::debug!("Revoked session token");
        }
        Ok(removed)
    }
}
