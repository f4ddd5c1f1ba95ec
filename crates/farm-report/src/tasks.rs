//! Task summary.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use farm_core::enums::TaskStatus;
use farm_core::filter::DateRange;
use farm_core::task::Task;
use farm_storage::DocumentAccess;
use farm_storage::error::Result;

use crate::load;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub overdue: usize,
    /// Completed over all tasks that were not cancelled.
    pub completion_rate: f64,
}

pub fn summarize_tasks(tasks: &[Task], today: NaiveDate) -> TaskSummary {
    let mut summary = TaskSummary {
        total: tasks.len(),
        ..TaskSummary::default()
    };
    let (mut completed, mut cancelled) = (0usize, 0usize);
    for t in tasks {
        *summary.by_status.entry(t.status.to_string()).or_default() += 1;
        match t.status {
            TaskStatus::Completed => completed += 1,
            TaskStatus::Cancelled => cancelled += 1,
            _ => {}
        }
        if t.is_overdue(today) {
            summary.overdue += 1;
        }
    }
    let considered = summary.total - cancelled;
    if considered > 0 {
        let rate = completed as f64 / considered as f64;
        summary.completion_rate = (rate * 10_000.0).round() / 10_000.0;
    }
    summary
}

/// Tasks due within `range`.
pub fn task_summary<A>(access: &A, range: DateRange, today: NaiveDate) -> Result<TaskSummary>
where
    A: DocumentAccess + ?Sized,
{
    let tasks: Vec<Task> = load(access, range)?;
    Ok(summarize_tasks(&tasks, today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(day: u32, status: TaskStatus) -> Task {
        let mut t = Task::new("t", NaiveDate::from_ymd_opt(2024, 9, day).unwrap());
        t.status = status;
        t
    }

    #[test]
    fn counts_and_rate() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 10).unwrap();
        let tasks = vec![
            task(1, TaskStatus::Completed),
            task(2, TaskStatus::Pending),
            task(3, TaskStatus::InProgress),
            task(4, TaskStatus::Cancelled),
            task(20, TaskStatus::Pending),
        ];
        let s = summarize_tasks(&tasks, today);
        assert_eq!(s.total, 5);
        assert_eq!(s.by_status["pending"], 2);
        assert_eq!(s.by_status["in_progress"], 1);
        assert_eq!(s.overdue, 2);
        assert_eq!(s.completion_rate, 0.25);
    }

    #[test]
    fn all_cancelled_rate_is_zero() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 10).unwrap();
        let s = summarize_tasks(&[task(1, TaskStatus::Cancelled)], today);
        assert_eq!(s.completion_rate, 0.0);
        assert_eq!(s.overdue, 0);
    }
}
