//! Query-string parameters shared by list and report endpoints.

use chrono::NaiveDate;
use serde::Deserialize;

use farm_core::filter::{DateRange, DocumentQuery};

/// Largest page a list endpoint returns.
pub const MAX_LIMIT: usize = 1000;

/// A field a list endpoint may be filtered on.
#[derive(Debug, Clone, Copy)]
pub enum Filter {
    /// Exact match.
    Exact(&'static str),
    /// Match ignoring case, for free-text tags like feed type or house.
    Tag(&'static str),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RangeParams {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.from, self.to)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,

    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub feed_type: Option<String>,
    pub record_type: Option<String>,
    pub category: Option<String>,
    pub assigned_to: Option<String>,
    pub house: Option<String>,
}

impl ListParams {
    fn value(&self, field: &str) -> Option<&str> {
        let v = match field {
            "status" => self.status.as_deref(),
            "paymentStatus" => self.payment_status.as_deref(),
            "feedType" => self.feed_type.as_deref(),
            "recordType" => self.record_type.as_deref(),
            "category" => self.category.as_deref(),
            "assignedTo" => self.assigned_to.as_deref(),
            "house" => self.house.as_deref(),
            _ => None,
        };
        v.map(str::trim).filter(|s| !s.is_empty())
    }

    /// Builds the document query, applying only the `filters` the
    /// resource supports. Others are ignored.
    pub fn query(&self, filters: &[Filter]) -> DocumentQuery {
        let mut q = DocumentQuery::new()
            .range(DateRange::new(self.from, self.to))
            .offset(self.offset)
            .limit(self.limit.unwrap_or(MAX_LIMIT).min(MAX_LIMIT));
        for filter in filters {
            q = match *filter {
                Filter::Exact(field) => match self.value(field) {
                    Some(v) => q.eq(field, v),
                    None => q,
                },
                Filter::Tag(field) => match self.value(field) {
                    Some(v) => q.eq_ignore_case(field, v),
                    None => q,
                },
            };
        }
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::filter::FieldFilter;
    use serde_json::json;

    #[test]
    fn only_supported_filters_apply() {
        let params = ListParams {
            status: Some("pending".into()),
            house: Some(" Coop A ".into()),
            category: Some("  ".into()),
            feed_type: Some("layers".into()),
            limit: Some(50_000),
            offset: 10,
            ..ListParams::default()
        };
        let q = params.query(&[
            Filter::Exact("status"),
            Filter::Tag("house"),
            Filter::Exact("category"),
        ]);
        assert_eq!(
            q.filters,
            vec![
                FieldFilter::Equals("status".into(), json!("pending")),
                FieldFilter::EqualsIgnoreCase("house".into(), "Coop A".into()),
            ]
        );
        assert_eq!(q.limit, Some(MAX_LIMIT));
        assert_eq!(q.offset, 10);
    }
}
