//! `farm export` -- write a collection as CSV or JSON lines.
//!
//! CSV is the report format and covers farm records only. JSON lines keep
//! every field, users included, and are what `farm import` reads back.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use tracing::info;

use farm_core::Document;
use farm_core::collection::Collection;
use farm_core::egg::EggProductionRecord;
use farm_core::feed::{FeedStock, FeedUsage};
use farm_core::filter::{DateRange, DocumentQuery};
use farm_core::finance::FinancialRecord;
use farm_core::jsonl::write_jsonl;
use farm_core::sales::SalesOrder;
use farm_core::task::Task;
use farm_core::user::User;
use farm_report::csv::export_csv;
use farm_storage::{DocumentAccess, Documents};

use crate::cli::{ExportArgs, ExportFormat};
use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext, args: &ExportArgs) -> Result<()> {
    let (store, _) = ctx.open_store()?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {path}"))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let range = args.range.range();
    let written = match args.format {
        ExportFormat::Csv => {
            let csv = export_csv(&store, args.collection, range)?;
            out.write_all(csv.body.as_bytes())?;
            csv.rows
        }
        ExportFormat::Jsonl => export_jsonl(&store, args.collection, range, &mut out)?,
    };
    out.flush()?;

    info!(collection = %args.collection, records = written, "exported");
    if let Some(path) = &args.output {
        if !ctx.quiet && !ctx.json {
            eprintln!("Wrote {written} record(s) to {path}");
        }
    }
    Ok(())
}

fn export_jsonl<A>(
    access: &A,
    collection: Collection,
    range: DateRange,
    out: &mut dyn Write,
) -> Result<usize>
where
    A: DocumentAccess + ?Sized,
{
    match collection {
        Collection::EggProduction => write_all::<EggProductionRecord, A>(access, range, out),
        Collection::SalesOrders => write_all::<SalesOrder, A>(access, range, out),
        Collection::FeedStock => write_all::<FeedStock, A>(access, range, out),
        Collection::FeedUsage => write_all::<FeedUsage, A>(access, range, out),
        Collection::FinancialRecords => write_all::<FinancialRecord, A>(access, range, out),
        Collection::Tasks => write_all::<Task, A>(access, range, out),
        Collection::Users => write_all::<User, A>(access, range, out),
    }
}

fn write_all<D, A>(access: &A, range: DateRange, mut out: &mut dyn Write) -> Result<usize>
where
    D: Document,
    A: DocumentAccess + ?Sized,
{
    let query = if D::DATE_FIELD.is_some() {
        DocumentQuery::new().range(range)
    } else {
        DocumentQuery::new()
    };
    let records = access.find::<D>(&query)?;
    write_jsonl(&mut out, &records).context("failed to write JSON lines")?;
    Ok(records.len())
}
