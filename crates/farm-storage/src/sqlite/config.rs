//! Config key-value store operations for [`SqliteStore`].

use std::collections::HashMap;

use rusqlite::{Connection, params};

use crate::error::{Result, StorageError};
use crate::sqlite::store::SqliteStore;

pub(crate) fn set_config_on_conn(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

pub(crate) fn get_config_on_conn(conn: &Connection, key: &str) -> Result<String> {
    conn.query_row(
        "SELECT value FROM config WHERE key = ?1",
        params![key],
        |row| row.get::<_, String>(0),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StorageError::not_found("config", key),
        other => StorageError::Query(other),
    })
}

impl SqliteStore {
    pub fn set_config_impl(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        set_config_on_conn(&conn, key, value)
    }

    pub fn get_config_impl(&self, key: &str) -> Result<String> {
        let conn = self.lock_conn()?;
        get_config_on_conn(&conn, key)
    }

    pub fn get_all_config_impl(&self) -> Result<HashMap<String, String>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut map = HashMap::new();
        for row in rows {
            let (k, v) = row?;
            map.insert(k, v);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_and_overwrite() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_config_impl("currency", "KES").unwrap();
        assert_eq!(store.get_config_impl("currency").unwrap(), "KES");
        store.set_config_impl("currency", "UGX").unwrap();
        assert_eq!(store.get_config_impl("currency").unwrap(), "UGX");
    }

    #[test]
    fn missing_key_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get_config_impl("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn defaults_are_listed() {
        let store = SqliteStore::open_in_memory().unwrap();
        let all = store.get_all_config_impl().unwrap();
        assert_eq!(all.get("farm_name").map(String::as_str), Some("Farmstead"));
        assert!(all.contains_key("currency"));
    }
}
