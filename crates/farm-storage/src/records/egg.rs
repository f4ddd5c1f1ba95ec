//! Egg production: batch numbering and per-day uniqueness.

use farm_core::Document;
use farm_core::egg::EggProductionRecord;
use farm_core::filter::DocumentQuery;
use farm_core::sequence::Numbering;

use crate::error::{Result, StorageError};
use crate::records::{Import, Record, RecordContext};
use crate::traits::{DocumentAccess, Storage, Transaction, transact};
use crate::typed::Documents;

/// The batch number the next new record would get.
pub fn next_batch_number<A>(access: &A, numbering: &Numbering) -> Result<String>
where
    A: DocumentAccess + ?Sized,
{
    let existing: Vec<EggProductionRecord> = access.all()?;
    Ok(numbering
        .batch
        .next(existing.iter().map(|r| r.batch_number.as_str())))
}

/// Rejects a second record with the same batch number on the same date.
fn ensure_unique<A>(access: &A, record: &EggProductionRecord) -> Result<()>
where
    A: DocumentAccess + ?Sized,
{
    let q = DocumentQuery::new()
        .eq("date", record.date.to_string())
        .eq("batchNumber", record.batch_number.clone());
    let clash = access
        .find::<EggProductionRecord>(&q)?
        .into_iter()
        .any(|other| other.id != record.id);
    if clash {
        return Err(StorageError::duplicate(
            EggProductionRecord::COLLECTION,
            "batchNumber",
            format!("{} on {}", record.batch_number, record.date),
        ));
    }
    Ok(())
}

/// Inserts a new record, numbering it when it arrives without a batch
/// number.
fn insert_new(
    tx: &dyn Transaction,
    mut record: EggProductionRecord,
    ctx: &RecordContext<'_>,
) -> Result<EggProductionRecord> {
    record.batch_number = record.batch_number.trim().to_owned();
    if record.batch_number.is_empty() {
        record.batch_number = next_batch_number(tx, ctx.numbering)?;
    }
    ensure_unique(tx, &record)?;
    tx.insert(record, ctx.actor)
}

impl Record for EggProductionRecord {
    fn create(store: &dyn Storage, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        transact(store, |tx| insert_new(tx, doc.clone(), ctx))
    }

    fn update(store: &dyn Storage, id: &str, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        transact(store, |tx| {
            let existing: EggProductionRecord = tx.get(id)?;
            let mut record = doc.clone();
            record.id = id.to_owned();
            record.batch_number = record.batch_number.trim().to_owned();
            if record.batch_number.is_empty() {
                record.batch_number = existing.batch_number.clone();
            }
            ensure_unique(tx, &record)?;
            tx.replace(record, ctx.actor)
        })
    }
}

impl Import for EggProductionRecord {
    fn import_one(tx: &dyn Transaction, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        insert_new(tx, doc, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::testutil::{ctx, store};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn numbers_are_assigned_sequentially() {
        let s = store();
        let a = EggProductionRecord::create(&s, EggProductionRecord::new(day(1), 100, 2), &ctx()).unwrap();
        let b = EggProductionRecord::create(&s, EggProductionRecord::new(day(2), 90, 1), &ctx()).unwrap();
        assert_eq!(a.batch_number, "BATCH-0001");
        assert_eq!(b.batch_number, "BATCH-0002");
        assert!(a.id.starts_with("egg-"));
        assert_eq!(next_batch_number(&s, &Numbering::default()).unwrap(), "BATCH-0003");
    }

    #[test]
    fn numbering_continues_after_highest() {
        let s = store();
        let mut r = EggProductionRecord::new(day(1), 10, 0);
        r.batch_number = "BATCH-0041".into();
        EggProductionRecord::create(&s, r, &ctx()).unwrap();
        let next = EggProductionRecord::create(&s, EggProductionRecord::new(day(1), 10, 0), &ctx()).unwrap();
        assert_eq!(next.batch_number, "BATCH-0042");
    }

    #[test]
    fn same_batch_on_same_day_is_rejected() {
        let s = store();
        let mut r = EggProductionRecord::new(day(1), 10, 0);
        r.batch_number = "B-1".into();
        EggProductionRecord::create(&s, r.clone(), &ctx()).unwrap();

        let err = EggProductionRecord::create(&s, r.clone(), &ctx()).unwrap_err();
        assert!(err.is_duplicate());

        r.date = day(2);
        EggProductionRecord::create(&s, r, &ctx()).unwrap();
    }

    #[test]
    fn update_keeps_number_and_created_at() {
        let s = store();
        let created = EggProductionRecord::create(&s, EggProductionRecord::new(day(1), 10, 0), &ctx()).unwrap();

        let mut edit = EggProductionRecord::new(day(1), 12, 1);
        edit.notes = "recount".into();
        let updated = EggProductionRecord::update(&s, &created.id, edit, &ctx()).unwrap();
        assert_eq!(updated.batch_number, created.batch_number);
        assert_eq!(updated.total_eggs, 12);
        assert_eq!(updated.created_at, created.created_at);

        let stored: EggProductionRecord = s.get(&created.id).unwrap();
        assert_eq!(stored.notes, "recount");
    }

    #[test]
    fn update_can_keep_its_own_number() {
        let s = store();
        let created = EggProductionRecord::create(&s, EggProductionRecord::new(day(1), 10, 0), &ctx()).unwrap();
        let same = created.clone();
        assert!(EggProductionRecord::update(&s, &created.id, same, &ctx()).is_ok());
    }

    #[test]
    fn invalid_records_are_not_stored() {
        let s = store();
        let err = EggProductionRecord::create(&s, EggProductionRecord::new(day(1), 5, 6), &ctx()).unwrap_err();
        assert!(err.is_validation());
        assert!(s.all::<EggProductionRecord>().unwrap().is_empty());
    }

    #[test]
    fn update_missing_is_not_found() {
        let s = store();
        let err = EggProductionRecord::update(&s, "egg-none", EggProductionRecord::new(day(1), 1, 0), &ctx())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
