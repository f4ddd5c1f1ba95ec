//! Income and expense records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Document, document_plumbing};
use crate::enums::{PaymentMethod, RecordType};
use crate::validation::{self, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    #[serde(rename = "_id", default)]
    pub id: String,

    /// Sequential reference number (`FIN-0001`). Unique.
    #[serde(default)]
    pub reference_number: String,

    pub date: NaiveDate,

    #[serde(default)]
    pub record_type: RecordType,

    /// Free-form category such as "feed", "egg sales", "vet".
    pub category: String,

    pub amount: f64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    /// Sales order this record settles, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_order: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl FinancialRecord {
    pub fn new(
        date: NaiveDate,
        record_type: RecordType,
        category: impl Into<String>,
        amount: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            reference_number: String::new(),
            date,
            record_type,
            category: category.into(),
            amount,
            description: String::new(),
            payment_method: PaymentMethod::default(),
            related_order: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount with sign: positive for income, negative for expense.
    pub fn signed_amount(&self) -> f64 {
        match self.record_type {
            RecordType::Income => self.amount,
            _ => -self.amount,
        }
    }
}

impl Document for FinancialRecord {
    const COLLECTION: &'static str = "financial_records";
    const ID_PREFIX: &'static str = "fin";
    const DATE_FIELD: Option<&'static str> = Some("date");

    document_plumbing!();

    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_financial_record(self)
    }

    fn label(&self) -> String {
        format!(
            "{} {} {:.2} ({})",
            self.reference_number, self.record_type, self.amount, self.category
        )
    }
}
