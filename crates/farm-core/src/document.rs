//! The [`Document`] trait shared by every persisted farm record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::validation::ValidationError;

/// A record stored as a JSON document in one named collection.
///
/// Storage handles ids and timestamps through this trait; everything else
/// about a record is opaque JSON to it.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table partition) name, e.g. `"egg_production"`.
    const COLLECTION: &'static str;

    /// Prefix for generated ids, e.g. `"egg"` -> `egg-4k2q9z`.
    const ID_PREFIX: &'static str;

    /// JSON field holding the record's business date, if any.
    ///
    /// Used for date-range filters and default ordering.
    const DATE_FIELD: Option<&'static str>;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn created_at(&self) -> DateTime<Utc>;

    /// Sets both storage timestamps.
    fn stamp(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>);

    /// Checks the record's own invariants (not cross-record uniqueness).
    fn validate(&self) -> Result<(), ValidationError>;

    /// Short human-readable label used in activity entries and search hits.
    fn label(&self) -> String;
}

/// Implements the id/timestamp plumbing of [`Document`] for a struct with
/// `id`, `created_at` and `updated_at` fields.
macro_rules! document_plumbing {
    () => {
        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }

        fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
            self.created_at
        }

        fn stamp(
            &mut self,
            created_at: chrono::DateTime<chrono::Utc>,
            updated_at: chrono::DateTime<chrono::Utc>,
        ) {
            self.created_at = created_at;
            self.updated_at = updated_at;
        }
    };
}

pub(crate) use document_plumbing;
