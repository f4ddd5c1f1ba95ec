//! Calendar helpers shared by the reports, the server and the CLI.

use chrono::{Datelike, Local, NaiveDate};

/// The farm's calendar day, in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `YYYY-MM` key of the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
