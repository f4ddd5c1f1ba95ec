//! Income and expense summary.

use std::collections::BTreeMap;

use serde::Serialize;

use farm_core::dates::month_key;
use farm_core::enums::RecordType;
use farm_core::filter::DateRange;
use farm_core::finance::FinancialRecord;
use farm_core::sales::round_cents;
use farm_storage::DocumentAccess;
use farm_storage::error::Result;

use crate::load;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    /// `YYYY-MM`.
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub records: usize,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub income_by_category: BTreeMap<String, f64>,
    pub expense_by_category: BTreeMap<String, f64>,
    pub monthly: Vec<MonthlyTotals>,
}

pub fn summarize_finance(records: &[FinancialRecord]) -> FinanceSummary {
    let mut summary = FinanceSummary {
        records: records.len(),
        ..FinanceSummary::default()
    };
    let mut months: BTreeMap<String, MonthlyTotals> = BTreeMap::new();

    for r in records {
        let month = months
            .entry(month_key(r.date))
            .or_insert_with_key(|key| MonthlyTotals {
                month: key.clone(),
                ..MonthlyTotals::default()
            });
        let category = r.category.trim().to_owned();
        match r.record_type {
            RecordType::Income => {
                summary.income += r.amount;
                month.income += r.amount;
                *summary.income_by_category.entry(category).or_default() += r.amount;
            }
            RecordType::Expense => {
                summary.expense += r.amount;
                month.expense += r.amount;
                *summary.expense_by_category.entry(category).or_default() += r.amount;
            }
            // Validation keeps these out of storage.
            RecordType::Custom(_) => {}
        }
    }

    summary.income = round_cents(summary.income);
    summary.expense = round_cents(summary.expense);
    summary.net = round_cents(summary.income - summary.expense);
    for v in summary
        .income_by_category
        .values_mut()
        .chain(summary.expense_by_category.values_mut())
    {
        *v = round_cents(*v);
    }
    summary.monthly = months
        .into_values()
        .map(|mut m| {
            m.income = round_cents(m.income);
            m.expense = round_cents(m.expense);
            m.net = round_cents(m.income - m.expense);
            m
        })
        .collect();
    summary
}

pub fn finance_summary<A>(access: &A, range: DateRange) -> Result<FinanceSummary>
where
    A: DocumentAccess + ?Sized,
{
    let records: Vec<FinancialRecord> = load(access, range)?;
    Ok(summarize_finance(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn rec(month: u32, kind: RecordType, category: &str, amount: f64) -> FinancialRecord {
        FinancialRecord::new(
            NaiveDate::from_ymd_opt(2024, month, 15).unwrap(),
            kind,
            category,
            amount,
        )
    }

    #[test]
    fn totals_categories_and_months() {
        let records = vec![
            rec(1, RecordType::Income, "egg sales", 300.0),
            rec(1, RecordType::Expense, "feed", 120.5),
            rec(2, RecordType::Expense, "feed", 80.0),
            rec(2, RecordType::Expense, "vet", 40.0),
            rec(2, RecordType::Income, "egg sales", 100.0),
        ];
        let s = summarize_finance(&records);
        assert_eq!(s.income, 400.0);
        assert_eq!(s.expense, 240.5);
        assert_eq!(s.net, 159.5);
        assert_eq!(s.expense_by_category["feed"], 200.5);
        assert_eq!(s.income_by_category["egg sales"], 400.0);

        assert_eq!(
            s.monthly,
            vec![
                MonthlyTotals {
                    month: "2024-01".into(),
                    income: 300.0,
                    expense: 120.5,
                    net: 179.5,
                },
                MonthlyTotals {
                    month: "2024-02".into(),
                    income: 100.0,
                    expense: 120.0,
                    net: -20.0,
                },
            ]
        );
    }

    #[test]
    fn empty() {
        let s = summarize_finance(&[]);
        assert_eq!(s.net, 0.0);
        assert!(s.monthly.is_empty());
    }
}
