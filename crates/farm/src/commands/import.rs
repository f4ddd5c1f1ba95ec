//! `farm import` -- load records from a JSON lines file.
//!
//! Records are inserted in one transaction with their ids and sequence
//! numbers kept. Blank numbers are assigned, and the uniqueness and
//! normalisation rules of a normal create apply. Feed stock is not
//! adjusted for imported usage. Any failure rolls the whole file back and
//! names the offending line.

use std::cell::Cell;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use farm_core::collection::Collection;
use farm_core::egg::EggProductionRecord;
use farm_core::feed::{FeedStock, FeedUsage};
use farm_core::finance::FinancialRecord;
use farm_core::jsonl::read_jsonl;
use farm_core::sales::SalesOrder;
use farm_core::task::Task;
use farm_core::user::User;
use farm_storage::records::{Import, RecordContext};
use farm_storage::{Documents, Storage, transact};

use crate::cli::ImportArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    imported: usize,
    skipped: usize,
}

pub fn run(ctx: &RuntimeContext, args: &ImportArgs) -> Result<()> {
    let (store, config) = ctx.open_store()?;
    let rctx = RecordContext::new(&ctx.actor, &config.numbering);
    let path = Path::new(&args.file);
    let skip = args.skip_existing;

    let tally = match args.collection {
        Collection::EggProduction => import::<EggProductionRecord>(&store, path, &rctx, skip),
        Collection::SalesOrders => import::<SalesOrder>(&store, path, &rctx, skip),
        Collection::FeedStock => import::<FeedStock>(&store, path, &rctx, skip),
        Collection::FeedUsage => import::<FeedUsage>(&store, path, &rctx, skip),
        Collection::FinancialRecords => import::<FinancialRecord>(&store, path, &rctx, skip),
        Collection::Tasks => import::<Task>(&store, path, &rctx, skip),
        Collection::Users => import::<User>(&store, path, &rctx, skip),
    }
    .with_context(|| format!("failed to import {}", path.display()))?;

    info!(
        collection = %args.collection,
        imported = tally.imported,
        skipped = tally.skipped,
        "imported"
    );
    if ctx.json {
        output_json(&json!({
            "collection": args.collection.slug(),
            "imported": tally.imported,
            "skipped": tally.skipped,
        }))?;
    } else if !ctx.quiet {
        println!(
            "Imported {} {} record(s), skipped {}",
            tally.imported, args.collection, tally.skipped
        );
    }
    Ok(())
}

/// Parses every record up front, each paired with its line number.
fn read_records<D: Import>(path: &Path) -> Result<Vec<(usize, D)>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut lines = read_jsonl::<D, _>(BufReader::new(file));
    let mut records = Vec::new();
    while let Some(record) = lines.next() {
        records.push((lines.line_number(), record?));
    }
    Ok(records)
}

fn import<D: Import>(
    store: &dyn Storage,
    path: &Path,
    rctx: &RecordContext<'_>,
    skip_existing: bool,
) -> Result<Tally> {
    let records = read_records::<D>(path)?;
    let current = Cell::new(0);
    let result = transact(store, |tx| {
        let mut tally = Tally::default();
        for (line, doc) in &records {
            current.set(*line);
            if skip_existing && !doc.id().is_empty() && tx.exists::<D>(doc.id())? {
                tally.skipped += 1;
                continue;
            }
            D::import_one(tx, doc.clone(), rctx)?;
            tally.imported += 1;
        }
        Ok(tally)
    });
    result.with_context(|| format!("record on line {} rejected", current.get()))
}
