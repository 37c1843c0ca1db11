use rusqlite::{params, Connection, OptionalExtension, Row};

use super::is_unique_violation;
use crate::error::{Error, Result};
use crate::models::RuleRecord;
use crate::rulesets::builtin::is_builtin_name;

fn rule_from_row(row: &Row) -> rusqlite::Result<RuleRecord> {
    let name: String = row.get("name")?;
    Ok(RuleRecord {
        id: row.get("id")?,
        is_builtin: is_builtin_name(&name),
        name,
        description: row.get::<_, Option<String>>("description")?.unwrap_or_default(),
        content: row.get("content")?,
        created_at: row.get::<_, Option<String>>("created_at")?.unwrap_or_default(),
    })
}

fn map_duplicate(err: rusqlite::Error, name: &str) -> Error {
    if is_unique_violation(&err) {
        Error::DuplicateName(name.to_string())
    } else {
        err.into()
    }
}

pub(crate) fn find_by_id(conn: &Connection, id: i64) -> Result<Option<RuleRecord>> {
    Ok(conn
        .query_row("SELECT * FROM rules WHERE id = ?1", params![id], rule_from_row)
        .optional()?)
}

pub(crate) fn find_by_name(conn: &Connection, name: &str) -> Result<Option<RuleRecord>> {
    Ok(conn
        .query_row(
            "SELECT * FROM rules WHERE name = ?1",
            params![name],
            rule_from_row,
        )
        .optional()?)
}

pub(crate) fn list_all(conn: &Connection) -> Result<Vec<RuleRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM rules ORDER BY name")?;
    let rows = stmt.query_map([], rule_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub(crate) fn insert(
    conn: &Connection,
    name: &str,
    description: &str,
    content: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO rules (name, description, content) VALUES (?1, ?2, ?3)",
        params![name, description, content],
    )
    .map_err(|e| map_duplicate(e, name))?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn update(
    conn: &Connection,
    id: i64,
    name: &str,
    description: &str,
    content: &str,
) -> Result<()> {
    conn.execute(
        "UPDATE rules SET name = ?1, description = ?2, content = ?3 WHERE id = ?4",
        params![name, description, content, id],
    )
    .map_err(|e| map_duplicate(e, name))?;
    Ok(())
}

pub(crate) fn delete(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn.execute("DELETE FROM rules WHERE id = ?1", params![id])? > 0)
}
