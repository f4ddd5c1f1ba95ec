//! Transaction wrapper for [`SqliteStore`].

use rusqlite::Connection;
use serde_json::Value;

use farm_core::filter::DocumentQuery;

use crate::error::{Result, StorageError};
use crate::sqlite::config;
use crate::sqlite::documents;
use crate::sqlite::sessions;
use crate::sqlite::store::SqliteStore;
use crate::traits::{DocumentAccess, Transaction, WriteMeta};

/// A connection with an open transaction.
///
/// Delegates to the same connection-level helpers as [`SqliteStore`].
pub(crate) struct SqliteTx<'a> {
    pub(crate) conn: &'a Connection,
}

impl DocumentAccess for SqliteTx<'_> {
    fn insert_document(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
        meta: WriteMeta<'_>,
    ) -> Result<()> {
        documents::insert_document_on_conn(self.conn, collection, id, body, meta)
    }

    fn get_document(&self, collection: &str, id: &str) -> Result<Value> {
        documents::get_document_on_conn(self.conn, collection, id)
    }

    fn replace_document(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
        meta: WriteMeta<'_>,
    ) -> Result<()> {
        documents::replace_document_on_conn(self.conn, collection, id, body, meta)
    }

    fn delete_document(&self, collection: &str, id: &str, meta: WriteMeta<'_>) -> Result<()> {
        documents::delete_document_on_conn(self.conn, collection, id, meta)
    }

    fn find_documents(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Value>> {
        documents::find_documents_on_conn(self.conn, collection, query)
    }

    fn count_documents(&self, collection: &str, query: &DocumentQuery) -> Result<usize> {
        documents::count_documents_on_conn(self.conn, collection, query)
    }
}

impl Transaction for SqliteTx<'_> {
    fn set_config(&self, key: &str, value: &str) -> Result<()> {
        config::set_config_on_conn(self.conn, key, value)
    }

    fn get_config(&self, key: &str) -> Result<String> {
        config::get_config_on_conn(self.conn, key)
    }

    fn delete_user_sessions(&self, user_id: &str) -> Result<usize> {
        sessions::delete_user_sessions_on_conn(self.conn, user_id)
    }
}

impl SqliteStore {
    /// Runs a closure inside a database transaction.
    pub fn run_in_transaction_impl(
        &self,
        f: &dyn Fn(&dyn Transaction) -> Result<()>,
    ) -> Result<()> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StorageError::Transaction(format!("failed to begin: {e}")))?;

        let sqlite_tx = SqliteTx { conn: &tx };
        f(&sqlite_tx)?;
        // Dropping `tx` on the error path above rolls back.
        tx.commit()
            .map_err(|e| StorageError::Transaction(format!("failed to commit: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::Documents;
    use farm_core::feed::FeedStock;

    #[test]
    fn commit_is_visible() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .run_in_transaction_impl(&|tx| {
                tx.insert(FeedStock::new("Layers", 10.0, 1.0), "amina")?;
                tx.set_config("currency", "KES")?;
                Ok(())
            })
            .unwrap();

        let all: Vec<FeedStock> = store.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(store.get_config_impl("currency").unwrap(), "KES");
    }

    #[test]
    fn rollback_on_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.run_in_transaction_impl(&|tx| {
            tx.insert(FeedStock::new("Layers", 10.0, 1.0), "amina")?;
            Err(StorageError::Internal("test rollback".into()))
        });
        assert!(result.is_err());

        let all: Vec<FeedStock> = store.all().unwrap();
        assert!(all.is_empty());
        assert!(store.recent_activity_impl(None, 10).unwrap().is_empty());
    }

    #[test]
    fn reads_inside_see_own_writes() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .run_in_transaction_impl(&|tx| {
                let s = tx.insert(FeedStock::new("Layers", 10.0, 1.0), "amina")?;
                let back: FeedStock = tx.get(&s.id)?;
                assert_eq!(back.quantity, 10.0);
                Ok(())
            })
            .unwrap();
    }
}
