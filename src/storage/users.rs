use async_trait::async_trait;
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::Credential;
use super::tables::*;
use crate::config::UserEntry;
use crate::credentials::{hash_entries, CredentialError, CredentialStore};

impl Database {
    // ========================================================================
    // User operations
    // ========================================================================

    /// Store a user unless the username is already taken.
    ///
    /// Existing users are never overwritten; returns whether a row was written.
    pub fn put_user_if_absent(&self, credential: &Credential) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let inserted = {
            let mut table = write_txn.open_table(USERS)?;
            let exists = table.get(credential.username.as_str())?.is_some();
            if !exists {
                let data = rmp_serde::to_vec_named(credential)?;
                table.insert(credential.username.as_str(), data.as_slice())?;
            }
            !exists
        };

        if inserted {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(inserted)
    }

    /// Get a user by username
    pub fn get_user(&self, username: &str) -> Result<Option<Credential>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(USERS)?;

        let user = table
            .get(username)?
            .map(|data| rmp_serde::from_slice::<Credential>(data.value()))
            .transpose()?;
        Ok(user)
    }

    /// Seed users from plaintext entries, skipping usernames already present.
    ///
    /// Returns the number of users written.
    pub fn seed_users(&self, entries: &[UserEntry]) -> Result<usize, CredentialError> {
        let mut seeded = 0;
        for credential in hash_entries(entries)? {
            if self.put_user_if_absent(&credential)? {
                tracing::info!(username = %credential.username, "Seeded user");
                seeded += 1;
            }
        }
        Ok(seeded)
    }
}

#[async_trait]
impl CredentialStore for Database {
    async fn find(&self, username: &str) -> Result<Option<Credential>, CredentialError> {
        Ok(self.get_user(username)?)
    }
}
