//! Document CRUD and queries for [`SqliteStore`].

use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{Connection, ErrorCode, params, params_from_iter};
use serde_json::Value;
use tracing::debug;

use farm_core::enums::ActivityAction;
use farm_core::filter::{DocumentQuery, FieldFilter, SortOrder};

use crate::error::{Result, StorageError};
use crate::sqlite::activity::record_activity_on_conn;
use crate::sqlite::store::{SqliteStore, format_datetime, parse_datetime};
use crate::traits::WriteMeta;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// JSON path for a top-level field. Field names are restricted so they can
/// be inlined into SQL.
fn json_path(field: &str) -> Result<String> {
    let ok = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !ok {
        return Err(StorageError::validation(format!(
            "invalid field name: {field:?}"
        )));
    }
    Ok(format!("$.{field}"))
}

fn sql_value(value: &Value) -> Result<Box<dyn ToSql>> {
    match value {
        Value::String(s) => Ok(Box::new(s.clone())),
        Value::Bool(b) => Ok(Box::new(i64::from(*b))),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Box::new(i)),
            (None, Some(f)) => Ok(Box::new(f)),
            _ => Err(StorageError::validation(format!("unsupported number: {n}"))),
        },
        other => Err(StorageError::validation(format!(
            "unsupported filter value: {other}"
        ))),
    }
}

/// Timestamp column value for a body field, normalised to fixed width.
fn timestamp_column(body: &Value, field: &str) -> String {
    let ts = body
        .get(field)
        .and_then(Value::as_str)
        .map(parse_datetime)
        .unwrap_or_else(Utc::now);
    format_datetime(&ts)
}

/// Expression used for date-range filtering and ordering.
fn date_expr(query: &DocumentQuery) -> Result<String> {
    match &query.date_field {
        Some(field) => Ok(format!("json_extract(body, '{}')", json_path(field)?)),
        None => Ok("substr(created_at, 1, 10)".to_string()),
    }
}

/// Builds the WHERE clause (without the keyword) and its parameters.
fn build_where(collection: &str, query: &DocumentQuery) -> Result<(String, Vec<Box<dyn ToSql>>)> {
    let mut clauses: Vec<String> = vec!["collection = ?1".to_string()];
    let mut param_values: Vec<Box<dyn ToSql>> = vec![Box::new(collection.to_owned())];

    for filter in &query.filters {
        let path = json_path(filter.field())?;
        match filter {
            FieldFilter::Equals(_, Value::Null) => {
                clauses.push(format!("json_extract(body, '{path}') IS NULL"));
            }
            FieldFilter::Equals(_, value) => {
                param_values.push(sql_value(value)?);
                clauses.push(format!(
                    "json_extract(body, '{path}') = ?{}",
                    param_values.len()
                ));
            }
            FieldFilter::EqualsIgnoreCase(_, value) => {
                param_values.push(Box::new(value.clone()));
                clauses.push(format!(
                    "lower(json_extract(body, '{path}')) = lower(?{})",
                    param_values.len()
                ));
            }
        }
    }

    let expr = date_expr(query)?;
    if let Some(from) = query.range.from {
        param_values.push(Box::new(from.to_string()));
        clauses.push(format!("{expr} >= ?{}", param_values.len()));
    }
    if let Some(to) = query.range.to {
        param_values.push(Box::new(to.to_string()));
        clauses.push(format!("{expr} <= ?{}", param_values.len()));
    }

    Ok((clauses.join(" AND "), param_values))
}

fn parse_body(body: &str) -> Result<Value> {
    Ok(serde_json::from_str(body)?)
}

// ---------------------------------------------------------------------------
// Connection-level helpers (used by both SqliteStore and Transaction)
// ---------------------------------------------------------------------------

pub(crate) fn insert_document_on_conn(
    conn: &Connection,
    collection: &str,
    id: &str,
    body: &Value,
    meta: WriteMeta<'_>,
) -> Result<()> {
    let created_at = timestamp_column(body, "createdAt");
    let updated_at = timestamp_column(body, "updatedAt");
    let text = serde_json::to_string(body)?;

    conn.execute(
        "INSERT INTO documents (collection, id, body, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![collection, id, text, created_at, updated_at],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref f, _) if f.code == ErrorCode::ConstraintViolation => {
            StorageError::duplicate(collection, "_id", id)
        }
        other => StorageError::Query(other),
    })?;

    debug!(collection, id, actor = meta.actor, "document created");
    record_activity_on_conn(conn, collection, id, ActivityAction::Created, meta, &updated_at)
}

pub(crate) fn get_document_on_conn(conn: &Connection, collection: &str, id: &str) -> Result<Value> {
    let body: String = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StorageError::not_found(collection, id),
            other => StorageError::Query(other),
        })?;
    parse_body(&body)
}

pub(crate) fn replace_document_on_conn(
    conn: &Connection,
    collection: &str,
    id: &str,
    body: &Value,
    meta: WriteMeta<'_>,
) -> Result<()> {
    let updated_at = timestamp_column(body, "updatedAt");
    let text = serde_json::to_string(body)?;

    let rows = conn.execute(
        "UPDATE documents SET body = ?3, updated_at = ?4 WHERE collection = ?1 AND id = ?2",
        params![collection, id, text, updated_at],
    )?;
    if rows == 0 {
        return Err(StorageError::not_found(collection, id));
    }

    debug!(collection, id, actor = meta.actor, "document updated");
    record_activity_on_conn(conn, collection, id, ActivityAction::Updated, meta, &updated_at)
}

pub(crate) fn delete_document_on_conn(
    conn: &Connection,
    collection: &str,
    id: &str,
    meta: WriteMeta<'_>,
) -> Result<()> {
    let rows = conn.execute(
        "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
        params![collection, id],
    )?;
    if rows == 0 {
        return Err(StorageError::not_found(collection, id));
    }

    debug!(collection, id, actor = meta.actor, "document deleted");
    let now = format_datetime(&Utc::now());
    record_activity_on_conn(conn, collection, id, ActivityAction::Deleted, meta, &now)
}

pub(crate) fn find_documents_on_conn(
    conn: &Connection,
    collection: &str,
    query: &DocumentQuery,
) -> Result<Vec<Value>> {
    let (where_sql, mut param_values) = build_where(collection, query)?;
    let direction = match query.order {
        SortOrder::Descending => "DESC",
        SortOrder::Ascending => "ASC",
    };
    let expr = date_expr(query)?;

    let limit = query
        .limit
        .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
        .unwrap_or(-1);
    param_values.push(Box::new(limit));
    let limit_idx = param_values.len();
    param_values.push(Box::new(i64::try_from(query.offset).unwrap_or(i64::MAX)));
    let offset_idx = param_values.len();

    let sql = format!(
        "SELECT body FROM documents WHERE {where_sql}
         ORDER BY {expr} {direction}, created_at {direction}, id {direction}
         LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params_from_iter(param_values.iter().map(|p| p.as_ref())),
        |row| row.get::<_, String>(0),
    )?;

    let mut docs = Vec::new();
    for row in rows {
        docs.push(parse_body(&row?)?);
    }
    Ok(docs)
}

pub(crate) fn count_documents_on_conn(
    conn: &Connection,
    collection: &str,
    query: &DocumentQuery,
) -> Result<usize> {
    let (where_sql, param_values) = build_where(collection, query)?;
    let sql = format!("SELECT COUNT(*) FROM documents WHERE {where_sql}");
    let count: i64 = conn.query_row(
        &sql,
        params_from_iter(param_values.iter().map(|p| p.as_ref())),
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or(0))
}

// ---------------------------------------------------------------------------
// SqliteStore methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    pub fn insert_document_impl(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
        meta: WriteMeta<'_>,
    ) -> Result<()> {
        let conn = self.lock_conn()?;
        insert_document_on_conn(&conn, collection, id, body, meta)
    }

    pub fn get_document_impl(&self, collection: &str, id: &str) -> Result<Value> {
        let conn = self.lock_conn()?;
        get_document_on_conn(&conn, collection, id)
    }

    pub fn replace_document_impl(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
        meta: WriteMeta<'_>,
    ) -> Result<()> {
        let conn = self.lock_conn()?;
        replace_document_on_conn(&conn, collection, id, body, meta)
    }

    pub fn delete_document_impl(&self, collection: &str, id: &str, meta: WriteMeta<'_>) -> Result<()> {
        let conn = self.lock_conn()?;
        delete_document_on_conn(&conn, collection, id, meta)
    }

    pub fn find_documents_impl(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Value>> {
        let conn = self.lock_conn()?;
        find_documents_on_conn(&conn, collection, query)
    }

    pub fn count_documents_impl(&self, collection: &str, query: &DocumentQuery) -> Result<usize> {
        let conn = self.lock_conn()?;
        count_documents_on_conn(&conn, collection, query)
    }
}
