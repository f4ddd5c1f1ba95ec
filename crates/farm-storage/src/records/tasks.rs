//! Task scheduling: completion stamps and recurring tasks.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use farm_core::enums::TaskStatus;
use farm_core::task::Task;

use crate::error::Result;
use crate::records::{Import, Record, RecordContext};
use crate::traits::{DocumentAccess, Storage, Transaction, transact};
use crate::typed::Documents;

/// Result of a status change. `next` is the follow-up occurrence created
/// when a recurring task was completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStatusChange {
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Task>,
}

/// Keeps `completed_at` in step with `status`, stamping now when a
/// completed task arrives without one.
fn normalise_completion(task: &mut Task) {
    let status = task.status.clone();
    task.set_status(status, Utc::now());
}

/// Inserts the next occurrence when `after` moved into completed from some
/// other status.
fn spawn_next(
    tx: &dyn Transaction,
    before: &TaskStatus,
    after: &Task,
    actor: &str,
) -> Result<Option<Task>> {
    if *before == TaskStatus::Completed || after.status != TaskStatus::Completed {
        return Ok(None);
    }
    let Some(next) = after.next_occurrence() else {
        return Ok(None);
    };
    let next = tx.insert(next, actor)?;
    info!(
        task = %after.id,
        next = %next.id,
        due = %next.due_date,
        "scheduled next occurrence"
    );
    Ok(Some(next))
}

/// Moves a task to `status`. Completing a recurring task schedules its
/// next occurrence in the same transaction.
pub fn set_task_status(
    store: &dyn Storage,
    id: &str,
    status: TaskStatus,
    ctx: &RecordContext<'_>,
) -> Result<TaskStatusChange> {
    transact(store, |tx| {
        let mut task: Task = tx.get(id)?;
        let before = task.status.clone();
        task.set_status(status.clone(), Utc::now());
        let task = tx.replace(task, ctx.actor)?;
        let next = spawn_next(tx, &before, &task, ctx.actor)?;
        Ok(TaskStatusChange { task, next })
    })
}

/// Unfinished tasks due before `today`, earliest first, most urgent first
/// within a day.
pub fn overdue_tasks<A>(access: &A, today: NaiveDate) -> Result<Vec<Task>>
where
    A: DocumentAccess + ?Sized,
{
    let mut overdue: Vec<Task> = access
        .all::<Task>()?
        .into_iter()
        .filter(|t| t.is_overdue(today))
        .collect();
    overdue.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
    });
    Ok(overdue)
}

impl Record for Task {
    fn create(store: &dyn Storage, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        let mut task = doc;
        task.title = task.title.trim().to_owned();
        normalise_completion(&mut task);
        store.insert(task, ctx.actor)
    }

    fn update(store: &dyn Storage, id: &str, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        transact(store, |tx| {
            let existing: Task = tx.get(id)?;
            let mut task = doc.clone();
            task.id = id.to_owned();
            task.title = task.title.trim().to_owned();
            if task.status == TaskStatus::Completed && task.completed_at.is_none() {
                task.completed_at = existing.completed_at;
            }
            normalise_completion(&mut task);
            let task = tx.replace(task, ctx.actor)?;
            spawn_next(tx, &existing.status, &task, ctx.actor)?;
            Ok(task)
        })
    }
}

impl Import for Task {
    fn import_one(tx: &dyn Transaction, doc: Self, ctx: &RecordContext<'_>) -> Result<Self> {
        let mut task = doc;
        task.title = task.title.trim().to_owned();
        normalise_completion(&mut task);
        tx.insert(task, ctx.actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::testutil::{ctx, store};
    use farm_core::enums::{Recurrence, TaskPriority};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn completing_stamps_and_reopening_clears() {
        let s = store();
        let t = Task::create(&s, Task::new("Clean coop", date(3, 1)), &ctx()).unwrap();
        assert!(t.completed_at.is_none());

        let done = set_task_status(&s, &t.id, TaskStatus::Completed, &ctx()).unwrap();
        assert!(done.task.completed_at.is_some());
        assert!(done.next.is_none());

        let reopened = set_task_status(&s, &t.id, TaskStatus::InProgress, &ctx()).unwrap();
        assert!(reopened.task.completed_at.is_none());
    }

    #[test]
    fn create_completed_task_gets_timestamp() {
        let s = store();
        let mut t = Task::new("Vaccinate", date(3, 1));
        t.status = TaskStatus::Completed;
        let saved = Task::create(&s, t, &ctx()).unwrap();
        assert!(saved.completed_at.is_some());
    }

    #[test]
    fn completing_recurring_task_schedules_next() {
        let s = store();
        let mut t = Task::new("Collect eggs", date(1, 31));
        t.recurrence = Recurrence::Monthly;
        t.priority = TaskPriority::High;
        let t = Task::create(&s, t, &ctx()).unwrap();

        let change = set_task_status(&s, &t.id, TaskStatus::Completed, &ctx()).unwrap();
        let next = change.next.unwrap();
        assert_eq!(next.due_date, date(2, 29));
        assert_eq!(next.status, TaskStatus::Pending);
        assert_eq!(next.priority, TaskPriority::High);
        assert_ne!(next.id, t.id);
        assert_eq!(s.all::<Task>().unwrap().len(), 2);
    }

    #[test]
    fn completing_twice_does_not_duplicate() {
        let s = store();
        let mut t = Task::new("Feed", date(3, 1));
        t.recurrence = Recurrence::Daily;
        let t = Task::create(&s, t, &ctx()).unwrap();

        set_task_status(&s, &t.id, TaskStatus::Completed, &ctx()).unwrap();
        let again = set_task_status(&s, &t.id, TaskStatus::Completed, &ctx()).unwrap();
        assert!(again.next.is_none());
        assert_eq!(s.all::<Task>().unwrap().len(), 2);
    }

    #[test]
    fn update_to_completed_schedules_next() {
        let s = store();
        let mut t = Task::new("Weekly check", date(3, 1));
        t.recurrence = Recurrence::Weekly;
        let t = Task::create(&s, t, &ctx()).unwrap();

        let mut edit = t.clone();
        edit.status = TaskStatus::Completed;
        let updated = Task::update(&s, &t.id, edit, &ctx()).unwrap();
        assert!(updated.completed_at.is_some());

        let dues: Vec<NaiveDate> = s.all::<Task>().unwrap().into_iter().map(|t| t.due_date).collect();
        assert!(dues.contains(&date(3, 8)));
    }

    #[test]
    fn overdue_ordering() {
        let s = store();
        let mut a = Task::new("low late", date(3, 1));
        a.priority = TaskPriority::Low;
        let mut b = Task::new("urgent late", date(3, 1));
        b.priority = TaskPriority::Urgent;
        let c = Task::new("earlier", date(2, 20));
        let d = Task::new("future", date(4, 1));
        let mut e = Task::new("done", date(1, 1));
        e.status = TaskStatus::Completed;
        for t in [a, b, c, d, e] {
            Task::create(&s, t, &ctx()).unwrap();
        }

        let titles: Vec<String> = overdue_tasks(&s, date(3, 15))
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["earlier", "urgent late", "low late"]);
    }
}
