//! Egg production records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Document, document_plumbing};
use crate::validation::{self, ValidationError};

/// One collection batch: how many eggs a house produced on a day, and how
/// they graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EggProductionRecord {
    #[serde(rename = "_id", default)]
    pub id: String,

    /// Sequential batch number (`BATCH-0001`). Unique per `date`.
    #[serde(default)]
    pub batch_number: String,

    pub date: NaiveDate,

    /// Poultry house or flock the batch came from.
    #[serde(default)]
    pub house: String,

    #[serde(default)]
    pub total_eggs: u32,

    #[serde(default)]
    pub broken_eggs: u32,

    #[serde(default)]
    pub grade_a: u32,

    #[serde(default)]
    pub grade_b: u32,

    #[serde(default)]
    pub grade_c: u32,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recorded_by: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl EggProductionRecord {
    /// Creates a record for `date` with the given egg counts and no grading.
    pub fn new(date: NaiveDate, total_eggs: u32, broken_eggs: u32) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            batch_number: String::new(),
            date,
            house: String::new(),
            total_eggs,
            broken_eggs,
            grade_a: 0,
            grade_b: 0,
            grade_c: 0,
            notes: String::new(),
            recorded_by: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Eggs that survived collection.
    pub fn good_eggs(&self) -> u32 {
        self.total_eggs.saturating_sub(self.broken_eggs)
    }

    /// Sum of all graded eggs.
    pub fn graded_eggs(&self) -> u32 {
        self.grade_a + self.grade_b + self.grade_c
    }

    /// Broken eggs as a fraction of the total (0.0 for an empty batch).
    pub fn damage_rate(&self) -> f64 {
        if self.total_eggs == 0 {
            return 0.0;
        }
        f64::from(self.broken_eggs) / f64::from(self.total_eggs)
    }
}

impl Document for EggProductionRecord {
    const COLLECTION: &'static str = "egg_production";
    const ID_PREFIX: &'static str = "egg";
    const DATE_FIELD: Option<&'static str> = Some("date");

    document_plumbing!();

    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_egg_record(self)
    }

    fn label(&self) -> String {
        format!("{} ({}, {} eggs)", self.batch_number, self.date, self.total_eggs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn derived_counts() {
        let mut r = EggProductionRecord::new(day(), 200, 10);
        r.grade_a = 150;
        r.grade_b = 30;
        r.grade_c = 10;
        assert_eq!(r.good_eggs(), 190);
        assert_eq!(r.graded_eggs(), 190);
        assert!((r.damage_rate() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn damage_rate_of_empty_batch_is_zero() {
        let r = EggProductionRecord::new(day(), 0, 0);
        assert_eq!(r.damage_rate(), 0.0);
    }

    #[test]
    fn serializes_camel_case_with_mongo_id() {
        let mut r = EggProductionRecord::new(day(), 12, 1);
        r.id = "egg-abcd".into();
        r.batch_number = "BATCH-0001".into();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["_id"], "egg-abcd");
        assert_eq!(v["batchNumber"], "BATCH-0001");
        assert_eq!(v["totalEggs"], 12);
        assert_eq!(v["date"], "2024-03-01");
        assert!(v.get("notes").is_none());
    }

    #[test]
    fn deserializes_minimal_payload() {
        let r: EggProductionRecord =
            serde_json::from_str(r#"{"date":"2024-03-01","totalEggs":40}"#).unwrap();
        assert_eq!(r.total_eggs, 40);
        assert_eq!(r.broken_eggs, 0);
        assert!(r.id.is_empty());
        assert!(r.batch_number.is_empty());
    }
}
