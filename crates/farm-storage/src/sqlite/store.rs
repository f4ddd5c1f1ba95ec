//! [`SqliteStore`] -- SQLite-backed document store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::sqlite::schema;

/// SQLite-backed implementation of the [`Storage`](crate::traits::Storage) trait.
///
/// Wraps a [`rusqlite::Connection`] in a `Mutex`; every operation takes the
/// lock for its whole duration.
pub struct SqliteStore {
    pub(crate) conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and brings its schema up to date.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening farm database");
        let conn = Connection::open(path)
            .map_err(|e| StorageError::Connection(format!("{}: {e}", path.display())))?;
        Self::from_connection(conn)
    }

    /// A private database that vanishes on drop. Tests use this.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!(":memory: {e}")))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_connection()?;
        store.init_schema()?;
        Ok(store)
    }

    fn configure_connection(&self) -> Result<()> {
        self.lock_conn()?
            .execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )
            .map_err(|e| StorageError::Connection(format!("pragma setup: {e}")))
    }

    /// Brings the schema to [`schema::CURRENT_SCHEMA_VERSION`] in one
    /// transaction. A database already at that version is left alone.
    pub(crate) fn init_schema(&self) -> Result<()> {
        let mut conn = self.lock_conn()?;

        let stored = stored_version(&conn);
        if stored >= schema::CURRENT_SCHEMA_VERSION {
            debug!(version = stored, "schema up to date");
            return Ok(());
        }

        let tx = conn
            .transaction()
            .map_err(|e| migration_error("begin", e))?;

        for ddl in schema::SCHEMA_STATEMENTS {
            tx.execute_batch(ddl).map_err(|e| StorageError::Migration {
                name: "create_tables".into(),
                reason: format!("{e} in `{}`", truncate(ddl.trim(), 120)),
            })?;
        }
        for (key, value) in schema::DEFAULT_CONFIG {
            tx.execute(
                "INSERT OR IGNORE INTO config (key, value) VALUES (?1, ?2)",
                rusqlite::params![key, value],
            )
            .map_err(|e| migration_error("seed_config", e))?;
        }
        for (name, sql) in schema::MIGRATIONS {
            let marker = format!("migration:{name}");
            let done: bool = tx
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM metadata WHERE key = ?1)",
                    [&marker],
                    |row| row.get(0),
                )
                .map_err(|e| migration_error(name, e))?;
            if done {
                continue;
            }
            debug!(migration = name, "applying");
            tx.execute_batch(sql).map_err(|e| migration_error(name, e))?;
            tx.execute(
                "INSERT INTO metadata (key, value) VALUES (?1, 'applied')",
                [&marker],
            )
            .map_err(|e| migration_error(name, e))?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
            [schema::CURRENT_SCHEMA_VERSION.to_string()],
        )
        .map_err(|e| migration_error("schema_version", e))?;

        tx.commit().map_err(|e| migration_error("commit", e))?;
        info!(from = stored, to = schema::CURRENT_SCHEMA_VERSION, "schema migrated");
        Ok(())
    }

    /// Every operation module goes through this lock.
    pub(crate) fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Connection(format!("mutex poisoned: {e}")))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SqliteStore { .. }")
    }
}

/// 0 for a fresh database.
fn stored_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT value FROM metadata WHERE key = 'schema_version'",
        [],
        |row| row.get::<_, String>(0),
    )
    .ok()
    .and_then(|v| v.parse().ok())
    .unwrap_or(0)
}

fn migration_error(step: &str, e: rusqlite::Error) -> StorageError {
    StorageError::Migration {
        name: step.to_owned(),
        reason: e.to_string(),
    }
}

/// Formats a timestamp as fixed-width ISO 8601 TEXT for SQLite.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses an ISO 8601 TEXT value from SQLite.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>().unwrap_or_else(|_| {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .map(|ndt| ndt.and_utc())
            .unwrap_or_else(|_| Utc::now())
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let mut short: String = s.chars().take(max).collect();
    short.push_str("...");
    short
}
