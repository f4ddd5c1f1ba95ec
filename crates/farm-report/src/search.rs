//! Case-insensitive search across the main record collections.

use serde::Serialize;
use serde_json::Value;

use farm_core::Document;
use farm_core::egg::EggProductionRecord;
use farm_core::feed::FeedStock;
use farm_core::sales::SalesOrder;
use farm_core::task::Task;
use farm_storage::DocumentAccess;
use farm_storage::error::Result;
use farm_storage::typed::Documents;

/// Fields never matched. Ids carry the collection prefix and timestamps
/// the current year, so either would hit everything.
const SKIPPED_FIELDS: &[&str] = &["_id", "createdAt", "updatedAt", "completedAt", "lastLogin"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub collection: String,
    pub id: String,
    pub label: String,
    pub record: Value,
}

/// True when any string value in `value`, at any depth, contains `needle`.
/// `needle` must already be lower-case.
fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|v| contains_text(v, needle)),
        Value::Object(map) => map
            .iter()
            .filter(|(k, _)| !SKIPPED_FIELDS.contains(&k.as_str()))
            .any(|(_, v)| contains_text(v, needle)),
        _ => false,
    }
}

fn search_collection<D, A>(access: &A, needle: &str, limit: Option<usize>, hits: &mut Vec<SearchHit>) -> Result<()>
where
    D: Document,
    A: DocumentAccess + ?Sized,
{
    let mut found = 0;
    for doc in access.all::<D>()? {
        if limit.is_some_and(|l| found >= l) {
            break;
        }
        let record = serde_json::to_value(&doc)?;
        if contains_text(&record, needle) {
            found += 1;
            hits.push(SearchHit {
                collection: D::COLLECTION.to_owned(),
                id: doc.id().to_owned(),
                label: doc.label(),
                record,
            });
        }
    }
    Ok(())
}

/// Searches egg production, sales orders, feed stock and tasks, in that
/// order. A blank query finds nothing. `limit` caps hits per collection.
pub fn search<A>(access: &A, query: &str, limit: Option<usize>) -> Result<Vec<SearchHit>>
where
    A: DocumentAccess + ?Sized,
{
    let needle = query.trim().to_lowercase();
    let mut hits = Vec::new();
    if needle.is_empty() {
        return Ok(hits);
    }
    search_collection::<EggProductionRecord, A>(access, &needle, limit, &mut hits)?;
    search_collection::<SalesOrder, A>(access, &needle, limit, &mut hits)?;
    search_collection::<FeedStock, A>(access, &needle, limit, &mut hits)?;
    search_collection::<Task, A>(access, &needle, limit, &mut hits)?;
    Ok(hits)
}
