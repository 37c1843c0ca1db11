use std::sync::Arc;

use log::info;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use super::{is_unique_violation, Database};
use crate::error::{Error, Result};

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Login accounts for the management API.
#[derive(Clone)]
pub struct AccountStore {
    db: Arc<Database>,
}

impl AccountStore {
    pub fn new(db: Arc<Database>) -> Self {
        AccountStore { db }
    }

    /// Creates the given account if no account exists yet.
    pub fn ensure_default_user(&self, username: &str, password: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let users: i64 = tx.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            if users == 0 {
                tx.execute(
                    "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                    params![username, hash_password(password)],
                )?;
                info!("Created default user '{}'", username);
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn verify_user(&self, username: &str, password: &str) -> Result<bool> {
        let stored: Option<String> = self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT password_hash FROM users WHERE username = ?1",
                    params![username],
                    |row| row.get(0),
                )
                .optional()?)
        })?;
        Ok(stored.is_some_and(|hash| hash == hash_password(password)))
    }

    /// Renames `username` and sets a new password in one transaction.
    pub fn change_account(
        &self,
        username: &str,
        new_username: &str,
        new_password: &str,
    ) -> Result<()> {
        let new_username = new_username.trim();
        if new_username.is_empty() || new_password.is_empty() {
            return Err(Error::Validation(
                "username and password must not be empty".to_string(),
            ));
        }

        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let updated = tx
                .execute(
                    "UPDATE users SET username = ?1, password_hash = ?2 WHERE username = ?3",
                    params![new_username, hash_password(new_password), username],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        Error::DuplicateName(new_username.to_string())
                    } else {
                        e.into()
                    }
                })?;
            if updated == 0 {
                return Err(Error::NotFound(format!("user {}", username)));
            }
            tx.commit()?;
            info!("Account '{}' updated", new_username);
            Ok(())
        })
    }
}
