//! Everything the dashboard shows, in one payload.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use farm_core::activity::ActivityEntry;
use farm_core::filter::DateRange;
use farm_storage::Storage;
use farm_storage::error::Result;

use crate::eggs::{EggSummary, egg_summary};
use crate::feed::{FeedSummary, feed_summary};
use crate::finance::{FinanceSummary, finance_summary};
use crate::sales::{SalesSummary, sales_summary};
use crate::tasks::{TaskSummary, task_summary};

const RECENT_ACTIVITY: usize = 10;

pub const DEFAULT_FARM_NAME: &str = "Farmstead";
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub farm_name: String,
    pub currency: String,
    pub range: DateRange,
    pub eggs: EggSummary,
    pub sales: SalesSummary,
    pub feed: FeedSummary,
    pub finance: FinanceSummary,
    pub tasks: TaskSummary,
    pub recent_activity: Vec<ActivityEntry>,
}

/// Reads a stored setting, falling back when it was never set.
fn setting<S: Storage + ?Sized>(store: &S, key: &str, fallback: &str) -> Result<String> {
    match store.get_config(key) {
        Ok(v) => Ok(v),
        Err(e) if e.is_not_found() => Ok(fallback.to_owned()),
        Err(e) => Err(e),
    }
}

pub fn dashboard<S>(store: &S, range: DateRange, today: NaiveDate) -> Result<Dashboard>
where
    S: Storage + ?Sized,
{
    debug!(?range, "building dashboard");
    Ok(Dashboard {
        farm_name: setting(store, "farm_name", DEFAULT_FARM_NAME)?,
        currency: setting(store, "currency", DEFAULT_CURRENCY)?,
        range,
        eggs: egg_summary(store, range)?,
        sales: sales_summary(store, range)?,
        feed: feed_summary(store, range)?,
        finance: finance_summary(store, range)?,
        tasks: task_summary(store, range, today)?,
        recent_activity: store.recent_activity(None, RECENT_ACTIVITY)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::egg::EggProductionRecord;
    use farm_core::sequence::Numbering;
    use farm_storage::SqliteStore;
    use farm_storage::records::{Record, RecordContext};

    #[test]
    fn dashboard_over_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_config("farm_name", "Green Acres").unwrap();
        let numbering = Numbering::default();
        let ctx = RecordContext::new("tester", &numbering);
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        EggProductionRecord::create(&store, EggProductionRecord::new(day, 200, 4), &ctx).unwrap();

        let d = dashboard(&store, DateRange::all(), day).unwrap();
        assert_eq!(d.farm_name, "Green Acres");
        assert_eq!(d.currency, "USD");
        assert_eq!(d.eggs.total_eggs, 200);
        assert_eq!(d.sales.orders, 0);
        assert_eq!(d.recent_activity.len(), 1);
        assert_eq!(d.recent_activity[0].actor, "tester");

        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["farmName"], "Green Acres");
        assert_eq!(json["eggs"]["totalEggs"], 200);
    }
}
