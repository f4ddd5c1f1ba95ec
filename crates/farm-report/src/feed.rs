//! Feed inventory summary.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use farm_core::feed::{FeedStock, FeedUsage, feed_type_key};
use farm_core::filter::DateRange;
use farm_storage::DocumentAccess;
use farm_storage::error::Result;
use farm_storage::typed::Documents;

use crate::{load, round2};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedTypeSummary {
    pub feed_type: String,
    pub quantity: f64,
    pub unit: String,
    pub reorder_level: f64,
    /// Quantity used within the range.
    pub used: f64,
    pub average_daily_usage: f64,
    /// Days until stock runs out at the average rate. `None` without usage.
    pub days_remaining: Option<f64>,
    pub low_stock: bool,
    pub stock_value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSummary {
    pub items: Vec<FeedTypeSummary>,
    pub low_stock: Vec<String>,
    pub total_stock_value: f64,
    pub total_used: f64,
}

/// Days the usage average is spread over: the range when it is closed,
/// otherwise first to last usage date.
fn usage_days(range: DateRange, usage: &[FeedUsage]) -> Option<i64> {
    if let Some(days) = range.days() {
        return Some(days);
    }
    let first: NaiveDate = usage.iter().map(|u| u.date).min()?;
    let last: NaiveDate = usage.iter().map(|u| u.date).max()?;
    Some((last - first).num_days() + 1)
}

pub fn summarize_feed(stock: &[FeedStock], usage: &[FeedUsage], range: DateRange) -> FeedSummary {
    let in_range: Vec<FeedUsage> = usage
        .iter()
        .filter(|u| range.contains(u.date))
        .cloned()
        .collect();
    let mut used_by_type: HashMap<String, f64> = HashMap::new();
    for u in &in_range {
        *used_by_type.entry(feed_type_key(&u.feed_type)).or_default() += u.quantity;
    }
    let days = usage_days(range, &in_range);

    let mut by_type: BTreeMap<String, FeedTypeSummary> = BTreeMap::new();
    for s in stock {
        let key = feed_type_key(&s.feed_type);
        let used = used_by_type.get(&key).copied().unwrap_or(0.0);
        let average = match days {
            Some(d) if d > 0 && used > 0.0 => used / d as f64,
            _ => 0.0,
        };
        let days_remaining = (average > 0.0).then(|| round2(s.quantity / average));
        by_type.insert(
            key,
            FeedTypeSummary {
                feed_type: s.feed_type.clone(),
                quantity: s.quantity,
                unit: s.unit.clone(),
                reorder_level: s.reorder_level,
                used: round2(used),
                average_daily_usage: round2(average),
                days_remaining,
                low_stock: s.is_low(),
                stock_value: round2(s.stock_value()),
            },
        );
    }

    let items: Vec<FeedTypeSummary> = by_type.into_values().collect();
    FeedSummary {
        low_stock: items
            .iter()
            .filter(|i| i.low_stock)
            .map(|i| i.feed_type.clone())
            .collect(),
        total_stock_value: round2(items.iter().map(|i| i.stock_value).sum()),
        total_used: round2(in_range.iter().map(|u| u.quantity).sum()),
        items,
    }
}

pub fn feed_summary<A>(access: &A, range: DateRange) -> Result<FeedSummary>
where
    A: DocumentAccess + ?Sized,
{
    let stock: Vec<FeedStock> = access.all()?;
    let usage: Vec<FeedUsage> = load(access, range)?;
    Ok(summarize_feed(&stock, &usage, range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }

    fn stock(feed: &str, qty: f64, reorder: f64, cost: f64) -> FeedStock {
        let mut s = FeedStock::new(feed, qty, reorder);
        s.unit_cost = cost;
        s
    }

    #[test]
    fn averages_over_closed_range() {
        let stock = vec![stock("Layers Mash", 100.0, 20.0, 0.5)];
        let usage = vec![
            FeedUsage::new("layers mash", 10.0, d(1)),
            FeedUsage::new("Layers Mash", 20.0, d(3)),
            FeedUsage::new("Layers Mash", 99.0, d(20)),
        ];
        let range = DateRange::new(Some(d(1)), Some(d(10)));

        let s = summarize_feed(&stock, &usage, range);
        let item = &s.items[0];
        assert_eq!(item.used, 30.0);
        assert_eq!(item.average_daily_usage, 3.0);
        assert_eq!(item.days_remaining, Some(33.33));
        assert_eq!(item.stock_value, 50.0);
        assert!(!item.low_stock);
        assert_eq!(s.total_used, 30.0);
    }

    #[test]
    fn open_range_spans_usage_dates() {
        let stock = vec![stock("Grower", 40.0, 0.0, 1.0)];
        let usage = vec![
            FeedUsage::new("Grower", 5.0, d(2)),
            FeedUsage::new("Grower", 5.0, d(5)),
        ];
        let s = summarize_feed(&stock, &usage, DateRange::all());
        assert_eq!(s.items[0].average_daily_usage, 2.5);
        assert_eq!(s.items[0].days_remaining, Some(16.0));
    }

    #[test]
    fn unused_and_low_stock() {
        let stock = vec![
            stock("Chick Mash", 5.0, 10.0, 2.0),
            stock("Broiler", 50.0, 10.0, 1.0),
        ];
        let s = summarize_feed(&stock, &[], DateRange::all());
        assert_eq!(s.items.len(), 2);
        assert_eq!(s.items[0].feed_type, "Broiler");
        assert_eq!(s.items[0].days_remaining, None);
        assert_eq!(s.low_stock, vec!["Chick Mash".to_string()]);
        assert_eq!(s.total_stock_value, 60.0);
    }
}
