//! Typed document access over any [`DocumentAccess`] implementation.

use chrono::Utc;

use farm_core::Document;
use farm_core::filter::DocumentQuery;
use farm_core::idgen::{adaptive_defaults, compute_adaptive_length, generate_document_id};

use crate::error::{Result, StorageError};
use crate::traits::{DocumentAccess, WriteMeta};

/// Nonces tried per length before widening the id.
const ID_ATTEMPTS_PER_LENGTH: u32 = 10;

/// Typed CRUD for [`Document`] records.
///
/// Implemented for every [`DocumentAccess`], so it works the same on a
/// store and inside a transaction.
pub trait Documents: DocumentAccess {
    /// Validates and stores a new record, assigning an id when it has none.
    /// Both timestamps are set to now.
    fn insert<D: Document>(&self, doc: D, actor: &str) -> Result<D>;

    fn get<D: Document>(&self, id: &str) -> Result<D>;

    /// Validates and overwrites an existing record, keeping its original
    /// `createdAt` and bumping `updatedAt`.
    fn replace<D: Document>(&self, doc: D, actor: &str) -> Result<D>;

    /// Removes a record and returns what was stored.
    fn delete<D: Document>(&self, id: &str, actor: &str) -> Result<D>;

    /// Runs `query` against `D`'s collection, using `D::DATE_FIELD` when
    /// the query names no date field.
    fn find<D: Document>(&self, query: &DocumentQuery) -> Result<Vec<D>>;

    fn all<D: Document>(&self) -> Result<Vec<D>> {
        self.find(&DocumentQuery::new())
    }

    fn count<D: Document>(&self, query: &DocumentQuery) -> Result<usize>;

    fn exists<D: Document>(&self, id: &str) -> Result<bool> {
        match self.get_document(D::COLLECTION, id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn with_date_field<D: Document>(query: &DocumentQuery) -> DocumentQuery {
    let mut q = query.clone();
    if q.date_field.is_none() {
        q.date_field = D::DATE_FIELD.map(str::to_owned);
    }
    q
}

fn decode<D: Document>(body: serde_json::Value) -> Result<D> {
    Ok(serde_json::from_value(body)?)
}

impl<T: DocumentAccess + ?Sized> Documents for T {
    fn insert<D: Document>(&self, mut doc: D, actor: &str) -> Result<D> {
        doc.validate()?;
        let now = Utc::now();
        doc.stamp(now, now);

        if doc.id().is_empty() {
            let id = new_id(self, &doc)?;
            doc.set_id(id);
        }

        let body = serde_json::to_value(&doc)?;
        let summary = doc.label();
        self.insert_document(
            D::COLLECTION,
            doc.id(),
            &body,
            WriteMeta {
                actor,
                summary: &summary,
            },
        )?;
        Ok(doc)
    }

    fn get<D: Document>(&self, id: &str) -> Result<D> {
        decode(self.get_document(D::COLLECTION, id)?)
    }

    fn replace<D: Document>(&self, mut doc: D, actor: &str) -> Result<D> {
        if doc.id().is_empty() {
            return Err(StorageError::validation("document id is required"));
        }
        doc.validate()?;
        let existing: D = self.get(doc.id())?;
        doc.stamp(existing.created_at(), Utc::now());

        let body = serde_json::to_value(&doc)?;
        let summary = doc.label();
        self.replace_document(
            D::COLLECTION,
            doc.id(),
            &body,
            WriteMeta {
                actor,
                summary: &summary,
            },
        )?;
        Ok(doc)
    }

    fn delete<D: Document>(&self, id: &str, actor: &str) -> Result<D> {
        let existing: D = self.get(id)?;
        let summary = existing.label();
        self.delete_document(
            D::COLLECTION,
            id,
            WriteMeta {
                actor,
                summary: &summary,
            },
        )?;
        Ok(existing)
    }

    fn find<D: Document>(&self, query: &DocumentQuery) -> Result<Vec<D>> {
        self.find_documents(D::COLLECTION, &with_date_field::<D>(query))?
            .into_iter()
            .map(decode)
            .collect()
    }

    fn count<D: Document>(&self, query: &DocumentQuery) -> Result<usize> {
        self.count_documents(D::COLLECTION, &with_date_field::<D>(query))
    }
}

/// Picks an unused id for `doc`, growing the length with the collection.
fn new_id<A, D>(access: &A, doc: &D) -> Result<String>
where
    A: DocumentAccess + ?Sized,
    D: Document,
{
    let existing = access.count_documents(D::COLLECTION, &DocumentQuery::new())?;
    let min_length = compute_adaptive_length(
        existing,
        adaptive_defaults::MIN_LENGTH,
        adaptive_defaults::MAX_LENGTH,
        adaptive_defaults::MAX_COLLISION_PROB,
    );
    let seed = serde_json::to_string(doc)?;
    let now = Utc::now();

    for length in min_length..=adaptive_defaults::MAX_LENGTH {
        for nonce in 0..ID_ATTEMPTS_PER_LENGTH {
            let id = generate_document_id(D::ID_PREFIX, &seed, now, nonce, length);
            match access.get_document(D::COLLECTION, &id) {
                Err(e) if e.is_not_found() => return Ok(id),
                Err(e) => return Err(e),
                Ok(_) => continue,
            }
        }
    }
    Err(StorageError::Internal(format!(
        "could not find a free id in {}",
        D::COLLECTION
    )))
}
