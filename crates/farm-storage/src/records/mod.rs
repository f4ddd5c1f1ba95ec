//! Record operations: the rules that span more than one document.
//!
//! Plain per-record validation lives on the types in `farm_core`; the code
//! here handles sequence numbers, uniqueness, feed stock bookkeeping,
//! recurring tasks, user accounts and sessions. Multi-step operations run in
//! a single transaction.

pub mod auth;
pub mod egg;
pub mod feed;
pub mod finance;
pub mod sales;
pub mod tasks;
pub mod users;

use farm_core::Document;
use farm_core::sequence::Numbering;

use crate::error::Result;
use crate::traits::{Storage, Transaction};
use crate::typed::Documents;

/// Who is acting and with which settings.
#[derive(Debug, Clone)]
pub struct RecordContext<'a> {
    pub actor: &'a str,
    pub numbering: &'a Numbering,
    /// Applied to new feed stock created with a reorder level of zero.
    pub default_reorder_level: f64,
}

impl<'a> RecordContext<'a> {
    pub fn new(actor: &'a str, numbering: &'a Numbering) -> Self {
        Self {
            actor,
            numbering,
            default_reorder_level: 0.0,
        }
    }

    pub fn with_default_reorder_level(mut self, level: f64) -> Self {
        self.default_reorder_level = level;
        self
    }
}

/// A record type with create/update/delete rules.
pub trait Record: Document {
    fn create(store: &dyn Storage, doc: Self, ctx: &RecordContext<'_>) -> Result<Self>;

    /// Replaces the record stored under `id` with `doc`.
    fn update(store: &dyn Storage, id: &str, doc: Self, ctx: &RecordContext<'_>) -> Result<Self>;

    fn remove(store: &dyn Storage, id: &str, ctx: &RecordContext<'_>) -> Result<Self> {
        store.delete::<Self>(id, ctx.actor)
    }
}

/// Loading previously exported records inside an open transaction.
///
/// Ids and sequence numbers are kept as given. Uniqueness and
/// normalisation follow [`Record::create`]; side effects on other records
/// (feed stock deductions, follow-up tasks) do not happen.
pub trait Import: Document {
    fn import_one(tx: &dyn Transaction, doc: Self, ctx: &RecordContext<'_>) -> Result<Self>;
}

impl Import for farm_core::user::User {
    fn import_one(tx: &dyn Transaction, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        users::import_user(tx, doc, ctx.actor)
    }
}
