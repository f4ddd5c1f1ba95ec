//! Scheduled farm work.

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Document, document_plumbing};
use crate::enums::{Recurrence, TaskCategory, TaskPriority, TaskStatus};
use crate::validation::{self, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", default)]
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default)]
    pub category: TaskCategory,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub assigned_to: String,

    pub due_date: NaiveDate,

    /// Set exactly when `status` is completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub recurrence: Recurrence,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            title: title.into(),
            description: String::new(),
            category: TaskCategory::default(),
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            assigned_to: String::new(),
            due_date,
            completed_at: None,
            recurrence: Recurrence::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overdue tasks are unfinished and due strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_finished() && self.due_date < today
    }

    /// Moves the task to `status`, keeping `completed_at` in step.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        if status == TaskStatus::Completed {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
        self.status = status;
    }

    /// Builds the next occurrence of a recurring task, or `None` for
    /// one-off tasks.
    pub fn next_occurrence(&self) -> Option<Task> {
        let due_date = next_due_date(self.due_date, &self.recurrence)?;
        let mut next = Task::new(self.title.clone(), due_date);
        next.description = self.description.clone();
        next.category = self.category.clone();
        next.priority = self.priority.clone();
        next.assigned_to = self.assigned_to.clone();
        next.recurrence = self.recurrence.clone();
        Some(next)
    }
}

/// Advances `due` by one recurrence step.
///
/// Monthly recurrence clamps to the last day of shorter months
/// (Jan 31 -> Feb 29 in a leap year).
pub fn next_due_date(due: NaiveDate, recurrence: &Recurrence) -> Option<NaiveDate> {
    match recurrence {
        Recurrence::Daily => due.checked_add_signed(Duration::days(1)),
        Recurrence::Weekly => due.checked_add_signed(Duration::weeks(1)),
        Recurrence::Monthly => due.checked_add_months(Months::new(1)),
        Recurrence::None | Recurrence::Custom(_) => None,
    }
}

impl Document for Task {
    const COLLECTION: &'static str = "tasks";
    const ID_PREFIX: &'static str = "tsk";
    const DATE_FIELD: Option<&'static str> = Some("dueDate");

    document_plumbing!();

    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_task(self)
    }

    fn label(&self) -> String {
        format!("{} (due {}, {})", self.title, self.due_date, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn overdue_only_when_unfinished_and_past_due() {
        let today = d(2024, 6, 10);
        let mut t = Task::new("Clean house 2", d(2024, 6, 9));
        assert!(t.is_overdue(today));

        t.due_date = today;
        assert!(!t.is_overdue(today));

        t.due_date = d(2024, 6, 1);
        t.status = TaskStatus::Cancelled;
        assert!(!t.is_overdue(today));
    }

    #[test]
    fn status_change_maintains_completed_at() {
        let now = Utc::now();
        let mut t = Task::new("Vaccinate", d(2024, 6, 9));
        t.set_status(TaskStatus::Completed, now);
        assert_eq!(t.completed_at, Some(now));

        t.set_status(TaskStatus::InProgress, now);
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn next_due_dates() {
        assert_eq!(next_due_date(d(2024, 1, 31), &Recurrence::Daily), Some(d(2024, 2, 1)));
        assert_eq!(next_due_date(d(2024, 1, 31), &Recurrence::Weekly), Some(d(2024, 2, 7)));
        assert_eq!(next_due_date(d(2024, 1, 31), &Recurrence::Monthly), Some(d(2024, 2, 29)));
        assert_eq!(next_due_date(d(2024, 1, 31), &Recurrence::None), None);
    }

    #[test]
    fn next_occurrence_copies_schedule_but_resets_state() {
        let mut t = Task::new("Collect eggs", d(2024, 6, 9));
        t.recurrence = Recurrence::Daily;
        t.assigned_to = "amina".into();
        t.id = "tsk-1".into();
        t.set_status(TaskStatus::Completed, Utc::now());

        let next = t.next_occurrence().unwrap();
        assert!(next.id.is_empty());
        assert_eq!(next.due_date, d(2024, 6, 10));
        assert_eq!(next.status, TaskStatus::Pending);
        assert!(next.completed_at.is_none());
        assert_eq!(next.assigned_to, "amina");
    }
}
