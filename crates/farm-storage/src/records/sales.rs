//! Sales orders: order numbering, totals and uniqueness.

use farm_core::Document;
use farm_core::filter::DocumentQuery;
use farm_core::sales::SalesOrder;
use farm_core::sequence::Numbering;

use crate::error::{Result, StorageError};
use crate::records::{Import, Record, RecordContext};
use crate::traits::{DocumentAccess, Storage, Transaction, transact};
use crate::typed::Documents;

pub fn next_order_number<A>(access: &A, numbering: &Numbering) -> Result<String>
where
    A: DocumentAccess + ?Sized,
{
    let existing: Vec<SalesOrder> = access.all()?;
    Ok(numbering
        .order
        .next(existing.iter().map(|o| o.order_number.as_str())))
}

fn ensure_unique<A>(access: &A, order: &SalesOrder) -> Result<()>
where
    A: DocumentAccess + ?Sized,
{
    let q = DocumentQuery::new().eq("orderNumber", order.order_number.clone());
    let clash = access
        .find::<SalesOrder>(&q)?
        .into_iter()
        .any(|other| other.id != order.id);
    if clash {
        return Err(StorageError::duplicate(
            SalesOrder::COLLECTION,
            "orderNumber",
            order.order_number.clone(),
        ));
    }
    Ok(())
}

fn insert_new(tx: &dyn Transaction, mut order: SalesOrder, ctx: &RecordContext<'_>) -> Result<SalesOrder> {
    order.order_number = order.order_number.trim().to_owned();
    if order.order_number.is_empty() {
        order.order_number = next_order_number(tx, ctx.numbering)?;
    }
    order.customer_name = order.customer_name.trim().to_owned();
    order.recompute();
    ensure_unique(tx, &order)?;
    tx.insert(order, ctx.actor)
}

impl Record for SalesOrder {
    fn create(store: &dyn Storage, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        transact(store, |tx| insert_new(tx, doc.clone(), ctx))
    }

    fn update(store: &dyn Storage, id: &str, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        transact(store, |tx| {
            let existing: SalesOrder = tx.get(id)?;
            let mut order = doc.clone();
            order.id = id.to_owned();
            order.order_number = order.order_number.trim().to_owned();
            if order.order_number.is_empty() {
                order.order_number = existing.order_number.clone();
            }
            order.customer_name = order.customer_name.trim().to_owned();
            order.recompute();
            ensure_unique(tx, &order)?;
            tx.replace(order, ctx.actor)
        })
    }
}

impl Import for SalesOrder {
    fn import_one(tx: &dyn Transaction, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        insert_new(tx, doc, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::testutil::{ctx, store};
    use chrono::NaiveDate;
    use farm_core::enums::PaymentStatus;
    use farm_core::sales::OrderItem;

    fn order(customer: &str) -> SalesOrder {
        SalesOrder::new(
            customer,
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            vec![OrderItem::new("tray", 3, 4.0)],
        )
    }

    #[test]
    fn create_assigns_number_and_recomputes_total() {
        let s = store();
        let mut o = order("Wanjiru");
        o.total_amount = 999.0;
        o.amount_paid = 12.0;
        let saved = SalesOrder::create(&s, o, &ctx()).unwrap();
        assert_eq!(saved.order_number, "ORD-0001");
        assert_eq!(saved.total_amount, 12.0);
        assert_eq!(saved.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn duplicate_order_numbers_rejected() {
        let s = store();
        let mut o = order("A");
        o.order_number = "ORD-0100".into();
        SalesOrder::create(&s, o.clone(), &ctx()).unwrap();
        assert!(SalesOrder::create(&s, o, &ctx()).unwrap_err().is_duplicate());

        let next = SalesOrder::create(&s, order("B"), &ctx()).unwrap();
        assert_eq!(next.order_number, "ORD-0101");
    }

    #[test]
    fn update_cannot_steal_another_number() {
        let s = store();
        let a = SalesOrder::create(&s, order("A"), &ctx()).unwrap();
        let b = SalesOrder::create(&s, order("B"), &ctx()).unwrap();

        let mut edit = b.clone();
        edit.order_number = a.order_number.clone();
        assert!(SalesOrder::update(&s, &b.id, edit, &ctx()).unwrap_err().is_duplicate());
    }

    #[test]
    fn update_recomputes_payment_status() {
        let s = store();
        let a = SalesOrder::create(&s, order("A"), &ctx()).unwrap();
        let mut edit = a.clone();
        edit.amount_paid = 5.0;
        let updated = SalesOrder::update(&s, &a.id, edit, &ctx()).unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Partial);
        assert_eq!(updated.order_number, a.order_number);
    }

    #[test]
    fn huge_prices_never_reach_the_store() {
        let s = store();
        let overflow = SalesOrder::new(
            "A",
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            vec![OrderItem::new("tray", 10, f64::MAX / 2.0)],
        );
        assert!(SalesOrder::create(&s, overflow, &ctx()).unwrap_err().is_validation());

        let mut big = order("B");
        big.items = vec![OrderItem::new("tray", 1, 1e307)];
        let saved = SalesOrder::create(&s, big, &ctx()).unwrap();
        assert!(saved.total_amount.is_finite());

        let all = s.all::<SalesOrder>().unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn import_recomputes_totals() {
        let s = store();
        let mut o = order("  Wanjiru ");
        o.id = "ord-kept".into();
        o.order_number = "ORD-0042".into();
        o.total_amount = 999.0;
        let saved = transact(&s, |tx| SalesOrder::import_one(tx, o.clone(), &ctx())).unwrap();
        assert_eq!(saved.id, "ord-kept");
        assert_eq!(saved.total_amount, 12.0);
        assert_eq!(saved.customer_name, "Wanjiru");

        let mut again = o.clone();
        again.id = "ord-other".into();
        let err = transact(&s, |tx| SalesOrder::import_one(tx, again.clone(), &ctx())).unwrap_err();
        assert!(err.is_duplicate());
    }

    #[test]
    fn overpayment_is_rejected() {
        let s = store();
        let mut o = order("A");
        o.amount_paid = 50.0;
        assert!(SalesOrder::create(&s, o, &ctx()).unwrap_err().is_validation());
    }
}
