//! Login sessions for [`SqliteStore`].

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use tracing::debug;

use farm_core::user::Session;

use crate::error::{Result, StorageError};
use crate::sqlite::store::{SqliteStore, format_datetime, parse_datetime};

pub(crate) fn delete_user_sessions_on_conn(conn: &Connection, user_id: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])?)
}

impl SqliteStore {
    pub fn create_session_impl(&self, session: &Session) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.token,
                session.user_id,
                format_datetime(&session.created_at),
                format_datetime(&session.expires_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_session_impl(&self, token: &str) -> Result<Session> {
        let conn = self.lock_conn()?;
        conn.query_row(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?1",
            params![token],
            |row| {
                let created_at: String = row.get(2)?;
                let expires_at: String = row.get(3)?;
                Ok(Session {
                    token: row.get(0)?,
                    user_id: row.get(1)?,
                    created_at: parse_datetime(&created_at),
                    expires_at: parse_datetime(&expires_at),
                })
            },
        )
        .map_err(|e| match e {
            // The token itself is never echoed back.
            rusqlite::Error::QueryReturnedNoRows => StorageError::not_found("session", "token"),
            other => StorageError::Query(other),
        })
    }

    pub fn delete_session_impl(&self, token: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    pub fn delete_user_sessions_impl(&self, user_id: &str) -> Result<usize> {
        let conn = self.lock_conn()?;
        delete_user_sessions_on_conn(&conn, user_id)
    }

    pub fn purge_expired_sessions_impl(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.lock_conn()?;
        let purged = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![format_datetime(&now)],
        )?;
        debug!(purged, "purged expired sessions");
        Ok(purged)
    }
}
