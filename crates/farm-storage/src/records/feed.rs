//! Feed stock and usage bookkeeping.
//!
//! Usage is tied to stock by feed type. Recording usage deducts from the
//! matching stock item; editing or deleting usage gives the old quantity
//! back first. Each of these runs in one transaction.

use chrono::NaiveDate;
use tracing::{info, warn};

use farm_core::Document;
use farm_core::feed::{FeedStock, FeedUsage, feed_type_key};

use crate::error::{Result, StorageError};
use crate::records::{Import, Record, RecordContext};
use crate::traits::{DocumentAccess, Storage, Transaction, transact};
use crate::typed::Documents;

/// Quantities are kept to three decimals to stop float drift. Values too
/// large to scale are left alone.
fn round_qty(v: f64) -> f64 {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded.is_finite() { rounded } else { v }
}

/// The stock item for `feed_type`, matched case-insensitively.
pub fn find_stock<A>(access: &A, feed_type: &str) -> Result<Option<FeedStock>>
where
    A: DocumentAccess + ?Sized,
{
    Ok(access
        .all::<FeedStock>()?
        .into_iter()
        .find(|s| s.matches(feed_type)))
}

/// Stock items at or below their reorder level, by feed type.
pub fn low_stock<A>(access: &A) -> Result<Vec<FeedStock>>
where
    A: DocumentAccess + ?Sized,
{
    let mut low: Vec<FeedStock> = access
        .all::<FeedStock>()?
        .into_iter()
        .filter(FeedStock::is_low)
        .collect();
    low.sort_by_key(|s| feed_type_key(&s.feed_type));
    Ok(low)
}

fn ensure_unique_type<A>(access: &A, stock: &FeedStock) -> Result<()>
where
    A: DocumentAccess + ?Sized,
{
    let clash = access
        .all::<FeedStock>()?
        .into_iter()
        .any(|other| other.id != stock.id && other.matches(&stock.feed_type));
    if clash {
        return Err(StorageError::duplicate(
            FeedStock::COLLECTION,
            "feedType",
            stock.feed_type.clone(),
        ));
    }
    Ok(())
}

/// Adds `quantity` to a stock item, optionally updating its unit cost.
pub fn restock(
    store: &dyn Storage,
    id: &str,
    quantity: f64,
    unit_cost: Option<f64>,
    date: NaiveDate,
    ctx: &RecordContext<'_>,
) -> Result<FeedStock> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(StorageError::validation(format!(
            "restock quantity must be greater than zero (got {quantity})"
        )));
    }
    transact(store, |tx| {
        let mut stock: FeedStock = tx.get(id)?;
        stock.quantity = round_qty(stock.quantity + quantity);
        if let Some(cost) = unit_cost {
            stock.unit_cost = cost;
        }
        stock.last_restocked = Some(date);
        info!(feed_type = %stock.feed_type, quantity, "restocked feed");
        tx.replace(stock, ctx.actor)
    })
}

impl Record for FeedStock {
    fn create(store: &dyn Storage, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        transact(store, |tx| {
            let mut stock = doc.clone();
            stock.feed_type = stock.feed_type.trim().to_owned();
            if stock.reorder_level == 0.0 {
                stock.reorder_level = ctx.default_reorder_level;
            }
            ensure_unique_type(tx, &stock)?;
            tx.insert(stock, ctx.actor)
        })
    }

    fn update(store: &dyn Storage, id: &str, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        transact(store, |tx| {
            let mut stock = doc.clone();
            stock.id = id.to_owned();
            stock.feed_type = stock.feed_type.trim().to_owned();
            ensure_unique_type(tx, &stock)?;
            tx.replace(stock, ctx.actor)
        })
    }
}

impl Import for FeedStock {
    fn import_one(tx: &dyn Transaction, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        let mut stock = doc;
        stock.feed_type = stock.feed_type.trim().to_owned();
        ensure_unique_type(tx, &stock)?;
        tx.insert(stock, ctx.actor)
    }
}

/// Deducts `usage` from its stock item and canonicalises its feed type.
fn apply_usage(tx: &dyn Transaction, usage: &mut FeedUsage, actor: &str) -> Result<()> {
    let Some(mut stock) = find_stock(tx, &usage.feed_type)? else {
        return Err(StorageError::validation(format!(
            "no feed stock for feed type {:?}",
            usage.feed_type.trim()
        )));
    };
    if usage.quantity > stock.quantity {
        return Err(StorageError::InsufficientStock {
            feed_type: stock.feed_type,
            available: stock.quantity,
            requested: usage.quantity,
        });
    }
    usage.feed_type = stock.feed_type.clone();
    stock.quantity = round_qty(stock.quantity - usage.quantity);
    if stock.is_low() {
        warn!(feed_type = %stock.feed_type, quantity = stock.quantity, "feed stock is low");
    }
    tx.replace(stock, actor)?;
    Ok(())
}

/// Gives a previous usage's quantity back to its stock item, if it still
/// exists.
fn restore_usage(tx: &dyn Transaction, usage: &FeedUsage, actor: &str) -> Result<()> {
    match find_stock(tx, &usage.feed_type)? {
        Some(mut stock) => {
            stock.quantity = round_qty(stock.quantity + usage.quantity);
            tx.replace(stock, actor)?;
        }
        None => warn!(
            feed_type = %usage.feed_type,
            "stock item gone, usage quantity not restored"
        ),
    }
    Ok(())
}

impl Record for FeedUsage {
    fn create(store: &dyn Storage, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        doc.validate()?;
        transact(store, |tx| {
            let mut usage = doc.clone();
            apply_usage(tx, &mut usage, ctx.actor)?;
            tx.insert(usage, ctx.actor)
        })
    }

    fn update(store: &dyn Storage, id: &str, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        doc.validate()?;
        transact(store, |tx| {
            let previous: FeedUsage = tx.get(id)?;
            restore_usage(tx, &previous, ctx.actor)?;

            let mut usage = doc.clone();
            usage.id = id.to_owned();
            apply_usage(tx, &mut usage, ctx.actor)?;
            tx.replace(usage, ctx.actor)
        })
    }

    fn remove(store: &dyn Storage, id: &str, ctx: &RecordContext<'_>) -> Result<Self> {
        transact(store, |tx| {
            let previous: FeedUsage = tx.get(id)?;
            restore_usage(tx, &previous, ctx.actor)?;
            tx.delete::<FeedUsage>(id, ctx.actor)
        })
    }
}

impl Import for FeedUsage {
    fn import_one(tx: &dyn Transaction, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        let mut usage = doc;
        usage.feed_type = usage.feed_type.trim().to_owned();
        if let Some(stock) = find_stock(tx, &usage.feed_type)? {
            usage.feed_type = stock.feed_type;
        }
        tx.insert(usage, ctx.actor)
    }
}
