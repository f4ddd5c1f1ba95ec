//! Activity log for [`SqliteStore`].

use rusqlite::{Connection, Row, params};

use farm_core::activity::ActivityEntry;
use farm_core::enums::ActivityAction;

use crate::error::Result;
use crate::sqlite::store::{SqliteStore, parse_datetime};
use crate::traits::WriteMeta;

const ACTIVITY_COLUMNS: &str = "id, collection, document_id, action, actor, summary, created_at";

fn scan_activity(row: &Row<'_>) -> rusqlite::Result<ActivityEntry> {
    let action: String = row.get("action")?;
    let created_at: String = row.get("created_at")?;
    Ok(ActivityEntry {
        id: row.get("id")?,
        collection: row.get("collection")?,
        document_id: row.get("document_id")?,
        action: ActivityAction::from(action),
        actor: row.get("actor")?,
        summary: row.get("summary")?,
        created_at: parse_datetime(&created_at),
    })
}

/// Appends an activity row.
pub(crate) fn record_activity_on_conn(
    conn: &Connection,
    collection: &str,
    document_id: &str,
    action: ActivityAction,
    meta: WriteMeta<'_>,
    created_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO activity (collection, document_id, action, actor, summary, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            collection,
            document_id,
            action.as_str(),
            meta.actor,
            meta.summary,
            created_at
        ],
    )?;
    Ok(())
}

impl SqliteStore {
    pub fn recent_activity_impl(
        &self,
        collection: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>> {
        let conn = self.lock_conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activity
             WHERE (?1 IS NULL OR collection = ?1)
             ORDER BY id DESC LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![collection, limit], scan_activity)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    pub fn document_activity_impl(&self, collection: &str, id: &str) -> Result<Vec<ActivityEntry>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activity
             WHERE collection = ?1 AND document_id = ?2
             ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![collection, id], scan_activity)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(actor: &str) -> WriteMeta<'_> {
        WriteMeta {
            actor,
            summary: "thing",
        }
    }

    #[test]
    fn recent_activity_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_document_impl("a", "1", &json!({}), meta("amina")).unwrap();
        store.insert_document_impl("b", "1", &json!({}), meta("joe")).unwrap();
        store.replace_document_impl("a", "1", &json!({"x": 1}), meta("joe")).unwrap();

        let all = store.recent_activity_impl(None, 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].action, ActivityAction::Updated);
        assert_eq!(all[0].actor, "joe");
        assert_eq!(all[2].actor, "amina");

        let only_a = store.recent_activity_impl(Some("a"), 10).unwrap();
        assert_eq!(only_a.len(), 2);
        assert!(only_a.iter().all(|e| e.collection == "a"));

        assert_eq!(store.recent_activity_impl(None, 1).unwrap().len(), 1);
    }

    #[test]
    fn document_history_oldest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_document_impl("a", "1", &json!({}), meta("amina")).unwrap();
        store.delete_document_impl("a", "1", meta("boss")).unwrap();

        let history = store.document_activity_impl("a", "1").unwrap();
        let actions: Vec<_> = history.iter().map(|e| e.action.clone()).collect();
        assert_eq!(actions, vec![ActivityAction::Created, ActivityAction::Deleted]);
        assert_eq!(history[1].summary, "thing");
    }
}
