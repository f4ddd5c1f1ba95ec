//! `farm search` -- free-text search across records.

use anyhow::Result;

use farm_report::search::search;

use crate::cli::SearchArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

pub fn run(ctx: &RuntimeContext, args: &SearchArgs) -> Result<()> {
    let (store, _) = ctx.open_store()?;
    let hits = search(&store, &args.query, args.limit)?;

    if ctx.json {
        return output_json(&hits);
    }
    if ctx.quiet {
        return Ok(());
    }
    if hits.is_empty() {
        println!("No matches for {:?}.", args.query);
        return Ok(());
    }
    let rows: Vec<Vec<String>> = hits
        .iter()
        .map(|h| vec![h.collection.clone(), h.id.clone(), h.label.clone()])
        .collect();
    output_table(&["COLLECTION", "ID", "RECORD"], &rows);
    println!("\n{} match(es)", hits.len());
    Ok(())
}
