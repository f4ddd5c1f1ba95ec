//! Egg production summary.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use farm_core::egg::EggProductionRecord;
use farm_core::filter::DateRange;
use farm_storage::DocumentAccess;
use farm_storage::error::Result;

use crate::{load, round2};

/// Totals for one calendar day, summed over houses and batches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEggs {
    pub date: NaiveDate,
    pub total_eggs: u64,
    pub broken_eggs: u64,
    pub good_eggs: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EggSummary {
    pub records: usize,
    pub total_eggs: u64,
    pub broken_eggs: u64,
    pub good_eggs: u64,
    pub grade_a: u64,
    pub grade_b: u64,
    pub grade_c: u64,
    /// Broken over total, 0 when nothing was collected.
    pub damage_rate: f64,
    /// Total eggs over the number of distinct days with records.
    pub average_per_day: f64,
    pub best_day: Option<DailyEggs>,
    pub daily: Vec<DailyEggs>,
}

pub fn summarize_eggs(records: &[EggProductionRecord]) -> EggSummary {
    let mut summary = EggSummary {
        records: records.len(),
        ..EggSummary::default()
    };
    let mut days: BTreeMap<NaiveDate, DailyEggs> = BTreeMap::new();

    for r in records {
        summary.total_eggs += u64::from(r.total_eggs);
        summary.broken_eggs += u64::from(r.broken_eggs);
        summary.good_eggs += u64::from(r.good_eggs());
        summary.grade_a += u64::from(r.grade_a);
        summary.grade_b += u64::from(r.grade_b);
        summary.grade_c += u64::from(r.grade_c);

        let day = days.entry(r.date).or_insert_with(|| DailyEggs {
            date: r.date,
            total_eggs: 0,
            broken_eggs: 0,
            good_eggs: 0,
        });
        day.total_eggs += u64::from(r.total_eggs);
        day.broken_eggs += u64::from(r.broken_eggs);
        day.good_eggs += u64::from(r.good_eggs());
    }

    if summary.total_eggs > 0 {
        let rate = summary.broken_eggs as f64 / summary.total_eggs as f64;
        summary.damage_rate = (rate * 10_000.0).round() / 10_000.0;
    }
    if !days.is_empty() {
        summary.average_per_day = round2(summary.total_eggs as f64 / days.len() as f64);
    }

    summary.daily = days.into_values().collect();
    // Earliest day wins a tie.
    summary.best_day = summary
        .daily
        .iter()
        .rev()
        .max_by_key(|d| d.total_eggs)
        .cloned();
    summary
}

pub fn egg_summary<A>(access: &A, range: DateRange) -> Result<EggSummary>
where
    A: DocumentAccess + ?Sized,
{
    let records: Vec<EggProductionRecord> = load(access, range)?;
    Ok(summarize_eggs(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rec(day: u32, total: u32, broken: u32) -> EggProductionRecord {
        EggProductionRecord::new(NaiveDate::from_ymd_opt(2024, 4, day).unwrap(), total, broken)
    }

    #[test]
    fn empty_input() {
        let s = summarize_eggs(&[]);
        assert_eq!(s.records, 0);
        assert_eq!(s.damage_rate, 0.0);
        assert_eq!(s.average_per_day, 0.0);
        assert!(s.best_day.is_none());
        assert!(s.daily.is_empty());
    }

    #[test]
    fn totals_and_daily_series() {
        let mut a = rec(2, 100, 4);
        a.grade_a = 60;
        a.grade_b = 30;
        let b = rec(2, 50, 1);
        let c = rec(1, 120, 0);

        let s = summarize_eggs(&[a, b, c]);
        assert_eq!(s.records, 3);
        assert_eq!(s.total_eggs, 270);
        assert_eq!(s.broken_eggs, 5);
        assert_eq!(s.good_eggs, 265);
        assert_eq!(s.grade_a, 60);
        assert_eq!(s.average_per_day, 135.0);
        assert_eq!(s.damage_rate, 0.0185);

        let dates: Vec<u64> = s.daily.iter().map(|d| d.total_eggs).collect();
        assert_eq!(dates, vec![120, 150]);
        assert_eq!(s.best_day.unwrap().total_eggs, 150);
    }

    #[test]
    fn best_day_tie_goes_to_earliest() {
        let s = summarize_eggs(&[rec(5, 80, 0), rec(3, 80, 0)]);
        assert_eq!(
            s.best_day.unwrap().date,
            NaiveDate::from_ymd_opt(2024, 4, 3).unwrap()
        );
    }
}
