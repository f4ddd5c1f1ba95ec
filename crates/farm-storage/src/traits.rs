//! Storage and Transaction traits -- the public API for document persistence.
//!
//! Documents cross this boundary as raw JSON; [`crate::typed::Documents`]
//! layers typed access on top for anything implementing
//! [`farm_core::Document`].

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use farm_core::activity::ActivityEntry;
use farm_core::filter::DocumentQuery;
use farm_core::user::Session;

use crate::error::{Result, StorageError};

/// A single document write, as recorded in the activity log.
#[derive(Debug, Clone, Copy)]
pub struct WriteMeta<'a> {
    /// Who made the change.
    pub actor: &'a str,
    /// Short human-readable description of the document.
    pub summary: &'a str,
}

/// Document CRUD shared by [`Storage`] and [`Transaction`].
///
/// Every write appends a row to the activity log in the same connection.
pub trait DocumentAccess {
    /// Inserts a new document. Fails with `Duplicate` if the id is taken.
    fn insert_document(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
        meta: WriteMeta<'_>,
    ) -> Result<()>;

    /// Returns the stored document body.
    fn get_document(&self, collection: &str, id: &str) -> Result<Value>;

    /// Overwrites an existing document. Fails with `NotFound` otherwise.
    fn replace_document(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
        meta: WriteMeta<'_>,
    ) -> Result<()>;

    fn delete_document(&self, collection: &str, id: &str, meta: WriteMeta<'_>) -> Result<()>;

    fn find_documents(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Value>>;

    /// Counts matching documents, ignoring `limit` and `offset`.
    fn count_documents(&self, collection: &str, query: &DocumentQuery) -> Result<usize>;
}

/// Operations available inside [`Storage::run_in_transaction`].
pub trait Transaction: DocumentAccess {
    fn set_config(&self, key: &str, value: &str) -> Result<()>;

    fn get_config(&self, key: &str) -> Result<String>;

    /// Removes every session belonging to `user_id`; returns how many.
    fn delete_user_sessions(&self, user_id: &str) -> Result<usize>;
}

/// Primary storage interface.
pub trait Storage: DocumentAccess + Send + Sync {
    // -- Sessions ------------------------------------------------------------

    fn create_session(&self, session: &Session) -> Result<()>;

    /// Looks up a session by token, expired or not.
    fn get_session(&self, token: &str) -> Result<Session>;

    fn delete_session(&self, token: &str) -> Result<()>;

    /// Removes every session belonging to `user_id`; returns how many.
    fn delete_user_sessions(&self, user_id: &str) -> Result<usize>;

    /// Removes sessions that expired at or before `now`; returns how many.
    fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize>;

    // -- Activity log --------------------------------------------------------

    /// Most recent entries first, optionally for a single collection.
    fn recent_activity(&self, collection: Option<&str>, limit: usize)
    -> Result<Vec<ActivityEntry>>;

    /// Entries for one document, oldest first.
    fn document_activity(&self, collection: &str, id: &str) -> Result<Vec<ActivityEntry>>;

    // -- Config --------------------------------------------------------------

    fn set_config(&self, key: &str, value: &str) -> Result<()>;

    fn get_config(&self, key: &str) -> Result<String>;

    fn get_all_config(&self) -> Result<HashMap<String, String>>;

    // -- Transactions --------------------------------------------------------

    /// Runs `f` inside a database transaction, committing on `Ok` and
    /// rolling back on `Err`.
    fn run_in_transaction(&self, f: &dyn Fn(&dyn Transaction) -> Result<()>) -> Result<()>;

    fn close(&self) -> Result<()>;
}

/// Runs `f` in a transaction and hands back the value it produced.
pub fn transact<S, T, F>(store: &S, f: F) -> Result<T>
where
    S: Storage + ?Sized,
    F: Fn(&dyn Transaction) -> Result<T>,
{
    let out = RefCell::new(None);
    store.run_in_transaction(&|tx| {
        let value = f(tx)?;
        *out.borrow_mut() = Some(value);
        Ok(())
    })?;
    out.into_inner()
        .ok_or_else(|| StorageError::Internal("transaction produced no result".into()))
}
