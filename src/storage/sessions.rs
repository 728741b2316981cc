use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::SessionToken;
use super::tables::*;
use crate::tokens::session::{new_session, SessionError, TokenStore};

impl Database {
    // ========================================================================
    // Session operations
    // ========================================================================

    /// Store a session token
    pub fn put_session(&self, session: &SessionToken) -> Result<(), DatabaseError> {
        debug_assert!(!session.token.is_empty(), "session token must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            let data = rmp_serde::to_vec_named(session)?;
            table.insert(session.token.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a session by its secret token value, expired or not
    pub fn get_session(&self, token: &str) -> Result<Option<SessionToken>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;

        let session = table
            .get(token)?
            .map(|data| rmp_serde::from_slice::<SessionToken>(data.value()))
            .transpose()?;
        Ok(session)
    }

    /// Get a session only if it is still live at `now`.
    ///
    /// An expired session is deleted as a side effect.
    pub fn get_live_session(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionToken>, DatabaseError> {
        match self.get_session(token)? {
            Some(session) if session.is_live_at(now) => Ok(Some(session)),
            Some(_) => {
                self.delete_session(token)?;
                tracing::debug!("Session token expired");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Delete a session by its secret token value
    pub fn delete_session(&self, token: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let removed = table.remove(token)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(deleted)
    }
}

#[async_trait]
impl TokenStore for Database {
    async fn store(&self, token: &str, username: &str) -> Result<SessionToken, SessionError> {
        let session = new_session(token, username, self.session_ttl)?;
        self.put_session(&session)?;
        Ok(session)
    }

    async fn validate(&self, token: &str) -> Result<Option<String>, SessionError> {
        let session = self.get_live_session(token, Utc::now())?;
        Ok(session.map(|s| s.username))
    }

    async fn remove(&self, token: &str) -> Result<bool, SessionError> {
        let deleted = self.delete_session(token)?;
        if deleted {
            tracing::debug!("Revoked session token");
        }
        Ok(deleted)
    }
}
