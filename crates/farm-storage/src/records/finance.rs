//! Financial records: reference numbering and uniqueness.

use farm_core::Document;
use farm_core::filter::DocumentQuery;
use farm_core::finance::FinancialRecord;
use farm_core::sequence::Numbering;

use crate::error::{Result, StorageError};
use crate::records::{Import, Record, RecordContext};
use crate::traits::{DocumentAccess, Storage, Transaction, transact};
use crate::typed::Documents;

pub fn next_reference_number<A>(access: &A, numbering: &Numbering) -> Result<String>
where
    A: DocumentAccess + ?Sized,
{
    let existing: Vec<FinancialRecord> = access.all()?;
    Ok(numbering
        .reference
        .next(existing.iter().map(|r| r.reference_number.as_str())))
}

fn ensure_unique<A>(access: &A, record: &FinancialRecord) -> Result<()>
where
    A: DocumentAccess + ?Sized,
{
    let q = DocumentQuery::new().eq("referenceNumber", record.reference_number.clone());
    let clash = access
        .find::<FinancialRecord>(&q)?
        .into_iter()
        .any(|other| other.id != record.id);
    if clash {
        return Err(StorageError::duplicate(
            FinancialRecord::COLLECTION,
            "referenceNumber",
            record.reference_number.clone(),
        ));
    }
    Ok(())
}

fn insert_new(
    tx: &dyn Transaction,
    mut record: FinancialRecord,
    ctx: &RecordContext<'_>,
) -> Result<FinancialRecord> {
    record.reference_number = record.reference_number.trim().to_owned();
    if record.reference_number.is_empty() {
        record.reference_number = next_reference_number(tx, ctx.numbering)?;
    }
    ensure_unique(tx, &record)?;
    tx.insert(record, ctx.actor)
}

impl Record for FinancialRecord {
    fn create(store: &dyn Storage, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        transact(store, |tx| insert_new(tx, doc.clone(), ctx))
    }

    fn update(store: &dyn Storage, id: &str, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        transact(store, |tx| {
            let existing: FinancialRecord = tx.get(id)?;
            let mut record = doc.clone();
            record.id = id.to_owned();
            record.reference_number = record.reference_number.trim().to_owned();
            if record.reference_number.is_empty() {
                record.reference_number = existing.reference_number;
            }
            ensure_unique(tx, &record)?;
            tx.replace(record, ctx.actor)
        })
    }
}

impl Import for FinancialRecord {
    fn import_one(tx: &dyn Transaction, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        insert_new(tx, doc, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::testutil::{ctx, store};
    use chrono::NaiveDate;
    use farm_core::enums::RecordType;

    fn expense(amount: f64) -> FinancialRecord {
        FinancialRecord::new(
            NaiveDate::from_ymd_opt(2024, 5, 9).unwrap(),
            RecordType::Expense,
            "feed",
            amount,
        )
    }

    #[test]
    fn references_are_sequential() {
        let s = store();
        let a = FinancialRecord::create(&s, expense(10.0), &ctx()).unwrap();
        let b = FinancialRecord::create(&s, expense(20.0), &ctx()).unwrap();
        assert_eq!(a.reference_number, "FIN-0001");
        assert_eq!(b.reference_number, "FIN-0002");
        assert!(a.id.starts_with("fin-"));
    }

    #[test]
    fn duplicate_reference_rejected() {
        let s = store();
        let mut r = expense(10.0);
        r.reference_number = "INV-7".into();
        FinancialRecord::create(&s, r.clone(), &ctx()).unwrap();
        let err = FinancialRecord::create(&s, r, &ctx()).unwrap_err();
        assert!(err.is_duplicate());
        assert!(err.to_string().contains("INV-7"));
    }

    #[test]
    fn import_enforces_unique_references() {
        let s = store();
        let mut a = expense(10.0);
        a.id = "fin-a".into();
        a.reference_number = " FIN-0001 ".into();
        let mut b = expense(20.0);
        b.id = "fin-b".into();
        b.reference_number = "FIN-0001".into();

        let err = transact(&s, |tx| {
            FinancialRecord::import_one(tx, a.clone(), &ctx())?;
            FinancialRecord::import_one(tx, b.clone(), &ctx())
        })
        .unwrap_err();
        assert!(err.is_duplicate());
        assert!(s.all::<FinancialRecord>().unwrap().is_empty());

        let kept = transact(&s, |tx| FinancialRecord::import_one(tx, a.clone(), &ctx())).unwrap();
        assert_eq!(kept.id, "fin-a");
        assert_eq!(kept.reference_number, "FIN-0001");
    }

    #[test]
    fn update_keeps_reference_when_blank() {
        let s = store();
        let a = FinancialRecord::create(&s, expense(10.0), &ctx()).unwrap();
        let updated = FinancialRecord::update(&s, &a.id, expense(12.5), &ctx()).unwrap();
        assert_eq!(updated.reference_number, a.reference_number);
        assert_eq!(updated.amount, 12.5);
    }

    #[test]
    fn zero_amount_is_invalid() {
        let s = store();
        assert!(FinancialRecord::create(&s, expense(0.0), &ctx()).unwrap_err().is_validation());
    }

    #[test]
    fn remove_returns_deleted_record() {
        let s = store();
        let a = FinancialRecord::create(&s, expense(10.0), &ctx()).unwrap();
        let gone = FinancialRecord::remove(&s, &a.id, &ctx()).unwrap();
        assert_eq!(gone.id, a.id);
        assert!(FinancialRecord::remove(&s, &a.id, &ctx()).unwrap_err().is_not_found());
    }
}
