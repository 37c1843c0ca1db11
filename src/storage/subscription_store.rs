use std::sync::Arc;

use log::{debug, info};
use rusqlite::{params, OptionalExtension, Row};

use super::token::generate_token;
use super::{is_unique_violation, Database};
use crate::error::{Error, Result};
use crate::models::subscription::{default_display_name, DEFAULT_UPDATE_INTERVAL_HOURS};
use crate::models::{HistoryEntry, SubscriptionMeta, SubscriptionRecord};

/// Attempts at finding an unused token before giving up.
const TOKEN_ATTEMPTS: usize = 5;

/// History entries returned when the caller does not ask for a limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Token-addressed storage of generated profiles.
#[derive(Clone)]
pub struct SubscriptionStore {
    db: Arc<Database>,
}

fn record_from_row(row: &Row) -> rusqlite::Result<SubscriptionRecord> {
    let token: String = row.get("token")?;
    let display_name = row
        .get::<_, Option<String>>("config_name")?
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| default_display_name(&token));
    Ok(SubscriptionRecord {
        document: row.get("config")?,
        display_name,
        proxies_count: row.get::<_, Option<i64>>("proxies_count")?.unwrap_or(0).max(0) as usize,
        auto_update: row.get::<_, Option<bool>>("auto_update")?.unwrap_or(true),
        update_interval_hours: row
            .get::<_, Option<i64>>("update_interval_hours")?
            .and_then(|h| u32::try_from(h).ok())
            .unwrap_or(DEFAULT_UPDATE_INTERVAL_HOURS),
        traffic_limit_gb: row
            .get::<_, Option<i64>>("traffic_limit_gb")?
            .and_then(|gb| u64::try_from(gb).ok())
            .unwrap_or(0),
        created_at: row.get::<_, Option<String>>("created_at")?.unwrap_or_default(),
        token,
    })
}

impl SubscriptionStore {
    pub fn new(db: Arc<Database>) -> Self {
        SubscriptionStore { db }
    }

    /// Persists a document and returns its freshly allocated token.
    pub fn save(
        &self,
        document: &str,
        proxies_count: usize,
        meta: &SubscriptionMeta,
    ) -> Result<String> {
        self.db.with_conn(|conn| {
            for _ in 0..TOKEN_ATTEMPTS {
                let token = generate_token(document);
                let display_name = meta
                    .display_name
                    .as_deref()
                    .filter(|name| !name.trim().is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| default_display_name(&token));

                let tx = conn.transaction()?;
                let inserted = tx.execute(
                    "INSERT INTO conversions
                     (token, config, proxies_count, config_name, auto_update, update_interval_hours, traffic_limit_gb)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        token,
                        document,
                        proxies_count as i64,
                        display_name,
                        meta.auto_update,
                        meta.update_interval_hours,
                        meta.traffic_limit_gb as i64,
                    ],
                );
                match inserted {
                    Ok(_) => {
                        tx.commit()?;
                        info!("Saved profile {} with {} proxies", token, proxies_count);
                        return Ok(token);
                    }
                    Err(err) if is_unique_violation(&err) => {
                        debug!("Token {} already taken, retrying", token);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Err(Error::Storage(
                "could not allocate a unique token".to_string(),
            ))
        })
    }

    pub fn get(&self, token: &str) -> Result<SubscriptionRecord> {
        self.db
            .with_conn(|conn| {
                Ok(conn
                    .query_row(
                        "SELECT * FROM conversions WHERE token = ?1",
                        params![token],
                        record_from_row,
                    )
                    .optional()?)
            })?
            .ok_or_else(|| Error::NotFound(format!("subscription {}", token)))
    }

    /// Deletes one profile; deleting an unknown token is not an error.
    pub fn delete(&self, token: &str) -> Result<bool> {
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM conversions WHERE token = ?1", params![token])?;
            tx.commit()?;
            Ok(removed > 0)
        })
    }

    pub fn delete_all(&self) -> Result<usize> {
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM conversions", [])?;
            tx.commit()?;
            info!("Cleared {} stored profiles", removed);
            Ok(removed)
        })
    }

    /// Most recent profiles first.
    pub fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM conversions ORDER BY created_at DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], record_from_row)?;
            let mut entries = Vec::new();
            for row in rows {
                let record = row?;
                entries.push(HistoryEntry {
                    token: record.token,
                    display_name: record.display_name,
                    proxies_count: record.proxies_count,
                    created_at: record.created_at,
                });
            }
            Ok(entries)
        })
    }
}
