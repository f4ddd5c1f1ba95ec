//! Sales orders.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Document, document_plumbing};
use crate::enums::{OrderStatus, PaymentStatus};
use crate::validation::{self, ValidationError};

/// A single line on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderItem {
    pub fn new(product: impl Into<String>, quantity: u32, unit_price: f64) -> Self {
        Self {
            product: product.into(),
            quantity,
            unit_price,
        }
    }

    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// A customer order for eggs or other farm produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    #[serde(rename = "_id", default)]
    pub id: String,

    /// Sequential order number (`ORD-0001`). Unique.
    #[serde(default)]
    pub order_number: String,

    pub customer_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub customer_phone: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub customer_email: String,

    pub order_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,

    #[serde(default)]
    pub items: Vec<OrderItem>,

    #[serde(default)]
    pub discount: f64,

    /// Always recomputed from `items` and `discount` before saving.
    #[serde(default)]
    pub total_amount: f64,

    #[serde(default)]
    pub amount_paid: f64,

    #[serde(default)]
    pub status: OrderStatus,

    /// Derived from `amount_paid` before saving.
    #[serde(default)]
    pub payment_status: PaymentStatus,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl SalesOrder {
    pub fn new(customer_name: impl Into<String>, order_date: NaiveDate, items: Vec<OrderItem>) -> Self {
        let now = Utc::now();
        let mut order = Self {
            id: String::new(),
            order_number: String::new(),
            customer_name: customer_name.into(),
            customer_phone: String::new(),
            customer_email: String::new(),
            order_date,
            delivery_date: None,
            items,
            discount: 0.0,
            total_amount: 0.0,
            amount_paid: 0.0,
            status: OrderStatus::default(),
            payment_status: PaymentStatus::default(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        };
        order.recompute();
        order
    }

    /// Sum of all line totals before discount.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Amount still owed.
    pub fn balance_due(&self) -> f64 {
        (self.total_amount - self.amount_paid).max(0.0)
    }

    /// Recomputes `total_amount` and `payment_status` from the line items.
    pub fn recompute(&mut self) {
        self.total_amount = round_cents((self.subtotal() - self.discount).max(0.0));
        self.payment_status = if self.amount_paid <= 0.0 {
            PaymentStatus::Unpaid
        } else if self.amount_paid + 0.005 >= self.total_amount {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        };
    }

    /// Revenue counts every order that has not been cancelled.
    pub fn counts_as_revenue(&self) -> bool {
        self.status != OrderStatus::Cancelled
    }
}

/// Rounds a money amount to two decimals. Values too large to scale are
/// left alone.
pub fn round_cents(v: f64) -> f64 {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded.is_finite() { rounded } else { v }
}

impl Document for SalesOrder {
    const COLLECTION: &'static str = "sales_orders";
    const ID_PREFIX: &'static str = "ord";
    const DATE_FIELD: Option<&'static str> = Some("orderDate");

    document_plumbing!();

    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_sales_order(self)
    }

    fn label(&self) -> String {
        format!("{} for {}", self.order_number, self.customer_name)
    }
}
