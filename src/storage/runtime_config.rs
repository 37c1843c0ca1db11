use std::sync::Arc;

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::Database;
use crate::error::Result;

/// Runtime override of `server.base_path`, used in generated subscription URLs.
pub const BASE_PATH_KEY: &str = "base_path";

/// Settings changed at runtime, kept as JSON values by key.
#[derive(Clone)]
pub struct RuntimeConfig {
    db: Arc<Database>,
}

impl RuntimeConfig {
    pub fn new(db: Arc<Database>) -> Self {
        RuntimeConfig { db }
    }

    /// Reads a stored value. Older databases hold plain strings and NULLs,
    /// which come back as a JSON string and as no value.
    pub fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let raw: Option<Option<String>> = self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT value FROM runtime_config WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?)
        })?;
        Ok(raw
            .flatten()
            .map(|raw| serde_json::from_str(&raw).unwrap_or(Value::String(raw))))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Ok(match self.get_value(key)? {
            Some(value) => Some(serde_json::from_value(value)?),
            None => None,
        })
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO runtime_config (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                params![key, raw],
            )?;
            tx.commit()?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_overwrite() {
        let config = RuntimeConfig::new(Arc::new(Database::open_in_memory().unwrap()));
        assert_eq!(config.get::<String>(BASE_PATH_KEY).unwrap(), None);

        config.set(BASE_PATH_KEY, &"/sub").unwrap();
        assert_eq!(
            config.get::<String>(BASE_PATH_KEY).unwrap(),
            Some("/sub".to_string())
        );

        config.set(BASE_PATH_KEY, &"/other").unwrap();
        assert_eq!(
            config.get::<String>(BASE_PATH_KEY).unwrap(),
            Some("/other".to_string())
        );
    }

    #[test]
    fn test_reads_plain_legacy_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE runtime_config (
                    key TEXT PRIMARY KEY,
                    value TEXT,
                    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );
                INSERT INTO runtime_config (key, value) VALUES ('base_path', '/sub');
                INSERT INTO runtime_config (key, value) VALUES ('limit', '25');
                INSERT INTO runtime_config (key, value) VALUES ('empty', NULL);",
            )
            .unwrap();
        }

        let config = RuntimeConfig::new(Arc::new(Database::open(&path).unwrap()));
        assert_eq!(
            config.get_value(BASE_PATH_KEY).unwrap(),
            Some(Value::String("/sub".to_string()))
        );
        assert_eq!(
            config.get::<String>(BASE_PATH_KEY).unwrap(),
            Some("/sub".to_string())
        );
        assert_eq!(config.get::<u32>("limit").unwrap(), Some(25));
        assert_eq!(config.get_value("empty").unwrap(), None);
        assert_eq!(config.get_value("missing").unwrap(), None);

        config.set(BASE_PATH_KEY, &"/next").unwrap();
        assert_eq!(
            config.get::<String>(BASE_PATH_KEY).unwrap(),
            Some("/next".to_string())
        );
    }
}
