//! Filter types for querying documents.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inclusive calendar date range. Missing bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Number of days covered, when both ends are set and ordered.
    pub fn days(&self) -> Option<i64> {
        match (self.from, self.to) {
            (Some(f), Some(t)) if t >= f => Some((t - f).num_days() + 1),
            _ => None,
        }
    }
}

/// A predicate on one top-level JSON field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// Field equals the value exactly.
    Equals(String, Value),
    /// String field equals the value ignoring ASCII case.
    EqualsIgnoreCase(String, String),
}

impl FieldFilter {
    pub fn field(&self) -> &str {
        match self {
            Self::Equals(f, _) | Self::EqualsIgnoreCase(f, _) => f,
        }
    }

    /// Evaluates the predicate against an in-memory document.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Self::Equals(field, value) => doc.get(field) == Some(value),
            Self::EqualsIgnoreCase(field, value) => doc
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.eq_ignore_ascii_case(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first by date field, then by creation time.
    #[default]
    Descending,
    Ascending,
}

/// Query over the documents of one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<FieldFilter>,

    /// JSON field the `range` applies to and results are ordered by.
    /// Documents without a date field order by `createdAt`.
    pub date_field: Option<String>,
    pub range: DateRange,

    pub order: SortOrder,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter::Equals(field.into(), value.into()));
        self
    }

    pub fn eq_ignore_case(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters
            .push(FieldFilter::EqualsIgnoreCase(field.into(), value.into()));
        self
    }

    pub fn date_field(mut self, field: impl Into<String>) -> Self {
        self.date_field = Some(field.into());
        self
    }

    pub fn range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn ascending(mut self) -> Self {
        self.order = SortOrder::Ascending;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn range_is_inclusive() {
        let r = DateRange::new(Some(d(1, 10)), Some(d(1, 20)));
        assert!(r.contains(d(1, 10)));
        assert!(r.contains(d(1, 20)));
        assert!(!r.contains(d(1, 9)));
        assert!(!r.contains(d(1, 21)));
        assert_eq!(r.days(), Some(11));
    }

    #[test]
    fn open_range() {
        let r = DateRange::new(None, Some(d(3, 1)));
        assert!(r.contains(d(1, 1)));
        assert!(!r.contains(d(3, 2)));
        assert_eq!(r.days(), None);
        assert!(DateRange::all().is_unbounded());
    }

    #[test]
    fn field_filters() {
        let doc = json!({"status": "pending", "feedType": "Layers Mash"});
        assert!(FieldFilter::Equals("status".into(), json!("pending")).matches(&doc));
        assert!(!FieldFilter::Equals("status".into(), json!("paid")).matches(&doc));
        assert!(FieldFilter::EqualsIgnoreCase("feedType".into(), "layers mash".into()).matches(&doc));
        assert!(!FieldFilter::EqualsIgnoreCase("missing".into(), "x".into()).matches(&doc));
    }

    #[test]
    fn builder() {
        let q = DocumentQuery::new()
            .eq("status", "pending")
            .date_field("date")
            .limit(5)
            .offset(10);
        assert_eq!(q.filters.len(), 1);
        assert_eq!(q.limit, Some(5));
        assert_eq!(q.offset, 10);
        assert_eq!(q.order, SortOrder::Descending);
    }
}
