//! CSV export.
//!
//! Output follows RFC 4180: CRLF line endings, and fields containing a
//! comma, quote, CR or LF are quoted with inner quotes doubled.

use std::borrow::Cow;

use farm_core::Document;
use farm_core::collection::Collection;
use farm_core::egg::EggProductionRecord;
use farm_core::feed::{FeedStock, FeedUsage};
use farm_core::filter::DateRange;
use farm_core::finance::FinancialRecord;
use farm_core::sales::SalesOrder;
use farm_core::task::Task;
use farm_storage::error::{Result, StorageError};
use farm_storage::typed::Documents;
use farm_storage::DocumentAccess;

use crate::load;

/// A record that can be written as one CSV row.
pub trait CsvRow {
    const HEADERS: &'static [&'static str];

    fn csv_row(&self) -> Vec<String>;
}

pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn push_line<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, f) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(f));
    }
    out.push_str("\r\n");
}

/// Header line plus one line per record.
pub fn to_csv<R: CsvRow>(records: &[R]) -> String {
    let mut out = String::new();
    push_line(&mut out, R::HEADERS.iter().copied());
    for r in records {
        let row = r.csv_row();
        push_line(&mut out, row.iter().map(String::as_str));
    }
    out
}

fn money(v: f64) -> String {
    format!("{v:.2}")
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl CsvRow for EggProductionRecord {
    const HEADERS: &'static [&'static str] = &[
        "id", "batchNumber", "date", "house", "totalEggs", "brokenEggs", "goodEggs", "gradeA",
        "gradeB", "gradeC", "recordedBy", "notes",
    ];

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.batch_number.clone(),
            self.date.to_string(),
            self.house.clone(),
            self.total_eggs.to_string(),
            self.broken_eggs.to_string(),
            self.good_eggs().to_string(),
            self.grade_a.to_string(),
            self.grade_b.to_string(),
            self.grade_c.to_string(),
            self.recorded_by.clone(),
            self.notes.clone(),
        ]
    }
}

impl CsvRow for SalesOrder {
    const HEADERS: &'static [&'static str] = &[
        "id", "orderNumber", "orderDate", "deliveryDate", "customerName", "customerPhone",
        "customerEmail", "items", "discount", "totalAmount", "amountPaid", "status",
        "paymentStatus", "notes",
    ];

    fn csv_row(&self) -> Vec<String> {
        let items = self
            .items
            .iter()
            .map(|i| format!("{} x{} @ {}", i.product, i.quantity, money(i.unit_price)))
            .collect::<Vec<_>>()
            .join("; ");
        vec![
            self.id.clone(),
            self.order_number.clone(),
            self.order_date.to_string(),
            opt(&self.delivery_date),
            self.customer_name.clone(),
            self.customer_phone.clone(),
            self.customer_email.clone(),
            items,
            money(self.discount),
            money(self.total_amount),
            money(self.amount_paid),
            self.status.to_string(),
            self.payment_status.to_string(),
            self.notes.clone(),
        ]
    }
}

impl CsvRow for FeedStock {
    const HEADERS: &'static [&'static str] = &[
        "id", "feedType", "quantity", "unit", "unitCost", "stockValue", "reorderLevel",
        "lowStock", "supplier", "lastRestocked", "notes",
    ];

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.feed_type.clone(),
            self.quantity.to_string(),
            self.unit.clone(),
            money(self.unit_cost),
            money(self.stock_value()),
            self.reorder_level.to_string(),
            self.is_low().to_string(),
            self.supplier.clone(),
            opt(&self.last_restocked),
            self.notes.clone(),
        ]
    }
}

impl CsvRow for FeedUsage {
    const HEADERS: &'static [&'static str] =
        &["id", "date", "feedType", "quantity", "house", "recordedBy", "notes"];

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.date.to_string(),
            self.feed_type.clone(),
            self.quantity.to_string(),
            self.house.clone(),
            self.recorded_by.clone(),
            self.notes.clone(),
        ]
    }
}

impl CsvRow for FinancialRecord {
    const HEADERS: &'static [&'static str] = &[
        "id", "referenceNumber", "date", "recordType", "category", "amount", "paymentMethod",
        "relatedOrder", "description",
    ];

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.reference_number.clone(),
            self.date.to_string(),
            self.record_type.to_string(),
            self.category.clone(),
            money(self.amount),
            self.payment_method.to_string(),
            opt(&self.related_order),
            self.description.clone(),
        ]
    }
}

impl CsvRow for Task {
    const HEADERS: &'static [&'static str] = &[
        "id", "title", "category", "priority", "status", "assignedTo", "dueDate", "completedAt",
        "recurrence", "description",
    ];

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.category.to_string(),
            self.priority.to_string(),
            self.status.to_string(),
            self.assigned_to.clone(),
            self.due_date.to_string(),
            self.completed_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            self.recurrence.to_string(),
            self.description.clone(),
        ]
    }
}

/// A rendered CSV document and the number of records in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub body: String,
    pub rows: usize,
}

fn export<D, A>(access: &A, range: DateRange) -> Result<CsvExport>
where
    D: Document + CsvRow,
    A: DocumentAccess + ?Sized,
{
    // Stock has no date of its own; the range does not apply to it.
    let records: Vec<D> = if D::DATE_FIELD.is_some() {
        load(access, range)?
    } else {
        access.all()?
    };
    Ok(CsvExport {
        body: to_csv(&records),
        rows: records.len(),
    })
}

/// Renders one collection as CSV, oldest first.
pub fn export_csv<A>(access: &A, collection: Collection, range: DateRange) -> Result<CsvExport>
where
    A: DocumentAccess + ?Sized,
{
    match collection {
        Collection::EggProduction => export::<EggProductionRecord, A>(access, range),
        Collection::SalesOrders => export::<SalesOrder, A>(access, range),
        Collection::FeedStock => export::<FeedStock, A>(access, range),
        Collection::FeedUsage => export::<FeedUsage, A>(access, range),
        Collection::FinancialRecords => export::<FinancialRecord, A>(access, range),
        Collection::Tasks => export::<Task, A>(access, range),
        Collection::Users => Err(StorageError::validation("users cannot be exported as CSV")),
    }
}
