//! Reporting over farm records.
//!
//! Summaries are plain arithmetic over the records in a date range. Each
//! `summarize_*` function works on a slice so it can be tested without a
//! store; the matching loader fetches the records first.

pub mod csv;
pub mod dashboard;
pub mod eggs;
pub mod feed;
pub mod finance;
pub mod sales;
pub mod search;
pub mod tasks;

use farm_core::Document;
use farm_core::filter::{DateRange, DocumentQuery};
use farm_storage::DocumentAccess;
use farm_storage::error::Result;
use farm_storage::typed::Documents;

/// Records of `D` within `range`, oldest first.
pub(crate) fn load<D, A>(access: &A, range: DateRange) -> Result<Vec<D>>
where
    D: Document,
    A: DocumentAccess + ?Sized,
{
    access.find::<D>(&DocumentQuery::new().range(range).ascending())
}

/// Two-decimal rounding for rates and averages in report output.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
