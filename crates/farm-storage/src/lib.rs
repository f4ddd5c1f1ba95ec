//! Storage backend for the farmstead system.
//!
//! Provides the [`Storage`] trait, a SQLite implementation ([`SqliteStore`]),
//! typed document access ([`Documents`]) and the record operations that
//! enforce cross-record rules ([`records`]).

pub mod error;
pub mod records;
pub mod sqlite;
pub mod traits;
pub mod typed;

pub use error::StorageError;
pub use sqlite::SqliteStore;
pub use traits::{DocumentAccess, Storage, Transaction, WriteMeta, transact};
pub use typed::Documents;

// ---------------------------------------------------------------------------
// Trait implementations for SqliteStore
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use farm_core::activity::ActivityEntry;
use farm_core::filter::DocumentQuery;
use farm_core::user::Session;

use crate::error::Result;

impl DocumentAccess for SqliteStore {
    fn insert_document(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
        meta: WriteMeta<'_>,
    ) -> Result<()> {
        self.insert_document_impl(collection, id, body, meta)
    }

    fn get_document(&self, collection: &str, id: &str) -> Result<Value> {
        self.get_document_impl(collection, id)
    }

    fn replace_document(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
        meta: WriteMeta<'_>,
    ) -> Result<()> {
        self.replace_document_impl(collection, id, body, meta)
    }

    fn delete_document(&self, collection: &str, id: &str, meta: WriteMeta<'_>) -> Result<()> {
        self.delete_document_impl(collection, id, meta)
    }

    fn find_documents(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Value>> {
        self.find_documents_impl(collection, query)
    }

    fn count_documents(&self, collection: &str, query: &DocumentQuery) -> Result<usize> {
        self.count_documents_impl(collection, query)
    }
}

impl Storage for SqliteStore {
    fn create_session(&self, session: &Session) -> Result<()> {
        self.create_session_impl(session)
    }

    fn get_session(&self, token: &str) -> Result<Session> {
        self.get_session_impl(token)
    }

    fn delete_session(&self, token: &str) -> Result<()> {
        self.delete_session_impl(token)
    }

    fn delete_user_sessions(&self, user_id: &str) -> Result<usize> {
        self.delete_user_sessions_impl(user_id)
    }

    fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        self.purge_expired_sessions_impl(now)
    }

    fn recent_activity(
        &self,
        collection: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>> {
        self.recent_activity_impl(collection, limit)
    }

    fn document_activity(&self, collection: &str, id: &str) -> Result<Vec<ActivityEntry>> {
        self.document_activity_impl(collection, id)
    }

    fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.set_config_impl(key, value)
    }

    fn get_config(&self, key: &str) -> Result<String> {
        self.get_config_impl(key)
    }

    fn get_all_config(&self) -> Result<HashMap<String, String>> {
        self.get_all_config_impl()
    }

    fn run_in_transaction(&self, f: &dyn Fn(&dyn Transaction) -> Result<()>) -> Result<()> {
        self.run_in_transaction_impl(f)
    }

    fn close(&self) -> Result<()> {
        // The connection closes when the store is dropped.
        Ok(())
    }
}
