//! `farm next-number` -- preview the next sequence number.
//!
//! Nothing is reserved; a record created afterwards may still take it.

use anyhow::Result;

use farm_storage::records::egg::next_batch_number;
use farm_storage::records::finance::next_reference_number;
use farm_storage::records::sales::next_order_number;

use crate::cli::{NextNumberArgs, SequenceKind};
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &NextNumberArgs) -> Result<()> {
    let (store, config) = ctx.open_store()?;
    let numbering = &config.numbering;

    let (key, number) = match args.kind {
        SequenceKind::Batch => ("batchNumber", next_batch_number(&store, numbering)?),
        SequenceKind::Order => ("orderNumber", next_order_number(&store, numbering)?),
        SequenceKind::Reference => ("referenceNumber", next_reference_number(&store, numbering)?),
    };

    if ctx.json {
        output_json(&serde_json::Map::from_iter([(key.to_owned(), number.into())]))
    } else {
        println!("{number}");
        Ok(())
    }
}
