//! SQLite persistence
//!
//! One [`Database`] owns the connection; the submodules add the queries for
//! each table. Every mutation runs in its own transaction.

pub mod accounts;
pub mod rules;
pub mod runtime_config;
pub mod subscription_store;
pub mod token;

use std::path::Path;
use std::sync::Mutex;

use log::{debug, info};
use rusqlite::{params, Connection};

use crate::error::{Error, Result};
use crate::rulesets::builtin::BUILTIN_RULESETS;

pub use subscription_store::SubscriptionStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS conversions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    token TEXT UNIQUE NOT NULL,
    config TEXT NOT NULL,
    proxies_count INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    description TEXT,
    content TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS runtime_config (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
";

/// Columns added to `conversions` after its first release, with the
/// definitions used to add them to older databases.
const CONVERSION_COLUMNS: &[(&str, &str)] = &[
    ("config_name", "TEXT"),
    ("auto_update", "INTEGER DEFAULT 1"),
    ("update_interval_hours", "INTEGER DEFAULT 24"),
    ("traffic_limit_gb", "INTEGER DEFAULT 0"),
];

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        info!("Opened database {}", path.as_ref().display());
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        migrate_conversions(&conn)?;
        seed_builtin_rules(&mut conn)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    /// Runs `f` with exclusive access to the connection.
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| Error::Storage("database connection lock poisoned".to_string()))?;
        f(&mut conn)
    }
}

fn column_names(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Adds the columns newer releases expect; existing rows get the defaults.
fn migrate_conversions(conn: &Connection) -> Result<()> {
    let existing = column_names(conn, "conversions")?;
    for (column, definition) in CONVERSION_COLUMNS {
        if !existing.iter().any(|c| c == column) {
            debug!("Adding column conversions.{}", column);
            conn.execute_batch(&format!(
                "ALTER TABLE conversions ADD COLUMN {} {}",
                column, definition
            ))?;
        }
    }
    Ok(())
}

/// Stores a copy of each built-in rule set unless one is already there.
fn seed_builtin_rules(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    for set in BUILTIN_RULESETS.iter() {
        tx.execute(
            "INSERT OR IGNORE INTO rules (name, description, content) VALUES (?1, ?2, ?3)",
            params![set.name, set.description, set.content()],
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// True when `err` is a UNIQUE constraint failure.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_and_seed() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM rules", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count as usize, BUILTIN_RULESETS.len());

        let columns = db
            .with_conn(|conn| column_names(conn, "conversions"))
            .unwrap();
        for (column, _) in CONVERSION_COLUMNS {
            assert!(columns.iter().any(|c| c == column), "missing {}", column);
        }
    }
}
