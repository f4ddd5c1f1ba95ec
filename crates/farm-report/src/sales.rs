//! Sales summary.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use farm_core::filter::DateRange;
use farm_core::sales::{SalesOrder, round_cents};
use farm_storage::DocumentAccess;
use farm_storage::error::Result;

use crate::load;

const TOP_CUSTOMERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTotal {
    pub customer: String,
    pub orders: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub orders: usize,
    /// Totals of every order that was not cancelled.
    pub revenue: f64,
    pub collected: f64,
    pub outstanding: f64,
    pub by_status: BTreeMap<String, usize>,
    pub by_payment_status: BTreeMap<String, usize>,
    pub top_customers: Vec<CustomerTotal>,
}

pub fn summarize_sales(orders: &[SalesOrder]) -> SalesSummary {
    let mut summary = SalesSummary {
        orders: orders.len(),
        ..SalesSummary::default()
    };
    // Keyed case-insensitively; the first spelling seen is displayed.
    let mut customers: HashMap<String, CustomerTotal> = HashMap::new();

    for o in orders {
        *summary.by_status.entry(o.status.to_string()).or_default() += 1;
        *summary
            .by_payment_status
            .entry(o.payment_status.to_string())
            .or_default() += 1;

        if !o.counts_as_revenue() {
            continue;
        }
        summary.revenue += o.total_amount;
        summary.collected += o.amount_paid;
        summary.outstanding += o.balance_due();

        let name = o.customer_name.trim();
        let entry = customers
            .entry(name.to_lowercase())
            .or_insert_with(|| CustomerTotal {
                customer: name.to_owned(),
                orders: 0,
                revenue: 0.0,
            });
        entry.orders += 1;
        entry.revenue += o.total_amount;
    }

    summary.revenue = round_cents(summary.revenue);
    summary.collected = round_cents(summary.collected);
    summary.outstanding = round_cents(summary.outstanding);

    let mut top: Vec<CustomerTotal> = customers
        .into_values()
        .map(|mut c| {
            c.revenue = round_cents(c.revenue);
            c
        })
        .collect();
    top.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.customer.cmp(&b.customer))
    });
    top.truncate(TOP_CUSTOMERS);
    summary.top_customers = top;
    summary
}

pub fn sales_summary<A>(access: &A, range: DateRange) -> Result<SalesSummary>
where
    A: DocumentAccess + ?Sized,
{
    let orders: Vec<SalesOrder> = load(access, range)?;
    Ok(summarize_sales(&orders))
}
