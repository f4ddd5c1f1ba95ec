//! Feed inventory and consumption.
//!
//! Stock and usage are linked only by the `feed_type` tag, compared
//! case-insensitively through [`feed_type_key`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Document, document_plumbing};
use crate::validation::{self, ValidationError};

fn default_unit() -> String {
    "kg".to_string()
}

/// Current inventory of one feed type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStock {
    #[serde(rename = "_id", default)]
    pub id: String,

    /// e.g. "Layers Mash". Unique, case-insensitive.
    pub feed_type: String,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default = "default_unit")]
    pub unit: String,

    #[serde(default)]
    pub unit_cost: f64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub supplier: String,

    /// Quantity at or below which the stock counts as low.
    #[serde(default)]
    pub reorder_level: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_restocked: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl FeedStock {
    pub fn new(feed_type: impl Into<String>, quantity: f64, reorder_level: f64) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            feed_type: feed_type.into(),
            quantity,
            unit: default_unit(),
            unit_cost: 0.0,
            supplier: String::new(),
            reorder_level,
            last_restocked: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_low(&self) -> bool {
        self.quantity <= self.reorder_level
    }

    pub fn stock_value(&self) -> f64 {
        self.quantity * self.unit_cost
    }

    pub fn matches(&self, feed_type: &str) -> bool {
        feed_type_key(&self.feed_type) == feed_type_key(feed_type)
    }
}

impl Document for FeedStock {
    const COLLECTION: &'static str = "feed_stock";
    const ID_PREFIX: &'static str = "fst";
    const DATE_FIELD: Option<&'static str> = None;

    document_plumbing!();

    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_feed_stock(self)
    }

    fn label(&self) -> String {
        format!("{} ({} {})", self.feed_type, self.quantity, self.unit)
    }
}

/// A quantity of feed consumed on a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedUsage {
    #[serde(rename = "_id", default)]
    pub id: String,

    /// Must match an existing [`FeedStock::feed_type`].
    pub feed_type: String,

    pub quantity: f64,

    pub date: NaiveDate,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub house: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recorded_by: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl FeedUsage {
    pub fn new(feed_type: impl Into<String>, quantity: f64, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            feed_type: feed_type.into(),
            quantity,
            date,
            house: String::new(),
            notes: String::new(),
            recorded_by: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for FeedUsage {
    const COLLECTION: &'static str = "feed_usage";
    const ID_PREFIX: &'static str = "fus";
    const DATE_FIELD: Option<&'static str> = Some("date");

    document_plumbing!();

    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_feed_usage(self)
    }

    fn label(&self) -> String {
        format!("{} {} on {}", self.quantity, self.feed_type, self.date)
    }
}

/// Normalised form of a feed type used for matching.
pub fn feed_type_key(feed_type: &str) -> String {
    feed_type.trim().to_lowercase()
}
