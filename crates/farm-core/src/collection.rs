//! The record collections and the names they go by.
//!
//! Each collection has a storage name (`egg_production`) and a URL slug
//! (`egg-production`). Either is accepted when parsing, along with a few
//! short forms used on the command line.

use std::fmt;
use std::str::FromStr;

use crate::Document;
use crate::egg::EggProductionRecord;
use crate::feed::{FeedStock, FeedUsage};
use crate::finance::FinancialRecord;
use crate::sales::SalesOrder;
use crate::task::Task;
use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    EggProduction,
    SalesOrders,
    FeedStock,
    FeedUsage,
    FinancialRecords,
    Tasks,
    Users,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection {0:?}")]
pub struct UnknownCollection(pub String);

impl Collection {
    /// Every collection holding farm records. Users are kept apart.
    pub const RECORDS: [Collection; 6] = [
        Self::EggProduction,
        Self::SalesOrders,
        Self::FeedStock,
        Self::FeedUsage,
        Self::FinancialRecords,
        Self::Tasks,
    ];

    /// Storage name, as in [`Document::COLLECTION`].
    pub fn name(self) -> &'static str {
        match self {
            Self::EggProduction => EggProductionRecord::COLLECTION,
            Self::SalesOrders => SalesOrder::COLLECTION,
            Self::FeedStock => FeedStock::COLLECTION,
            Self::FeedUsage => FeedUsage::COLLECTION,
            Self::FinancialRecords => FinancialRecord::COLLECTION,
            Self::Tasks => Task::COLLECTION,
            Self::Users => User::COLLECTION,
        }
    }

    /// Path segment under `/api/`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::EggProduction => "egg-production",
            Self::SalesOrders => "sales-orders",
            Self::FeedStock => "feed-stock",
            Self::FeedUsage => "feed-usage",
            Self::FinancialRecords => "financial-records",
            Self::Tasks => "task-scheduling",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        let found = match key.as_str() {
            "egg-production" | "eggs" | "egg" => Self::EggProduction,
            "sales-orders" | "sales" | "orders" => Self::SalesOrders,
            "feed-stock" | "stock" => Self::FeedStock,
            "feed-usage" | "usage" => Self::FeedUsage,
            "financial-records" | "finance" | "financial" => Self::FinancialRecords,
            "task-scheduling" | "tasks" | "task" => Self::Tasks,
            "users" | "user" => Self::Users,
            _ => return Err(UnknownCollection(s.to_owned())),
        };
        Ok(found)
    }
}
