//! Task write path. Persists task mutations and keeps reminders in step.
//!
//! Reminder scheduling runs after the mutation is committed. A scheduling
//! failure is logged and reported back, but never undoes the mutation.


use crate::reminders::{ReminderScheduler, ScheduleOutcome, SkipReason};
use chrono::{DateTime, Utc};
use deadliner_core::{
    error::DeadlinerError,
    task::{owner_for_chat, NewTask, Task, TaskChanges},
    traits::Clock,
};
use deadliner_store::Store;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Longest accepted task name.
const MAX_NAME_LEN: usize = 128;

/// What happened to the task's reminder as part of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderReport {
    Ok(ScheduleOutcome),
    /// Scheduling failed; the mutation itself succeeded.
    Warning(String),
}

impl fmt::Display for ReminderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok(outcome) => write!(f, "reminder: {outcome}"),
            Self::Warning(reason) => write!(f, "warning: reminder not updated ({reason})"),
        }
    }
}

/// The result of a task mutation plus its reminder report.
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    pub value: T,
    pub reminder: ReminderReport,
}

/// Input for a new task.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub chat_id: i64,
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    /// Category name; skip keywords mean "none".
    pub category: Option<String>,
}

/// Edits to an existing task. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    /// A skip keyword removes the category.
    pub category: Option<String>,
}

/// Task CRUD with reminder scheduling wired into every mutation.
pub struct TaskTracker {
    store: Store,
    scheduler: ReminderScheduler,
    clock: Arc<dyn Clock>,
}

impl TaskTracker {
    pub fn new(store: Store, scheduler: ReminderScheduler, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            scheduler,
            clock,
        }
    }

    pub async fn create_task(&self, draft: TaskDraft) -> Result<Tracked<Task>, DeadlinerError> {
        let name = validate_name(&draft.name)?;
        let category_id = match draft.category.as_deref() {
            Some(category) => self
                .store
                .find_or_create_category(category)
                .await?
                .map(|c| c.id),
            None => None,
        };

        let task = self
            .store
            .create_task(&NewTask {
                name,
                description: draft.description.trim().to_string(),
                deadline: draft.deadline,
                owner: owner_for_chat(draft.chat_id),
                category_id,
            })
            .await?;
        info!("tracker: created task '{}' ({})", task.name, task.id);

        let reminder = report(&task.name, self.scheduler.on_task_created(&task).await);
        Ok(Tracked {
            value: task,
            reminder,
        })
    }

    pub async fn update_task(
        &self,
        id: &str,
        edit: TaskEdit,
    ) -> Result<Tracked<Task>, DeadlinerError> {
        let name = edit.name.as_deref().map(validate_name).transpose()?;
        let category_id = match edit.category.as_deref() {
            Some(category) => Some(
                self.store
                    .find_or_create_category(category)
                    .await?
                    .map(|c| c.id),
            ),
            None => None,
        };
        let changes = TaskChanges {
            name,
            description: edit.description.map(|d| d.trim().to_string()),
            deadline: edit.deadline,
            category_id,
        };

        let task = self
            .store
            .update_task(id, &changes, self.clock.now())
            .await?
            .ok_or_else(|| DeadlinerError::NotFound(format!("task {id}")))?;
        info!("tracker: updated task '{}' ({})", task.name, task.id);

        let outcome = match self.scheduler.on_task_updated(&task).await {
            // Without an owner nothing gets scheduled, but an elapsed
            // deadline still must not leave a handle behind.
            Ok(ScheduleOutcome::Skipped(SkipReason::NoOwner))
                if task.deadline <= self.clock.now() =>
            {
                self.scheduler.on_deadline_passed_cleanup(&task).await
            }
            other => other,
        };
        let reminder = report(&task.name, outcome);
        Ok(Tracked {
            value: task,
            reminder,
        })
    }

    /// Delete a task. `value` is `false` when no such task existed.
    pub async fn delete_task(&self, id: &str) -> Result<Tracked<bool>, DeadlinerError> {
        let deleted = self.store.delete_task(id).await?;
        if deleted {
            info!("tracker: deleted task {id}");
        }
        let reminder = report(id, self.scheduler.on_task_deleted(id).await);
        Ok(Tracked {
            value: deleted,
            reminder,
        })
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, DeadlinerError> {
        self.store.get_task(id).await
    }

    pub async fn list_tasks(&self, chat_id: i64) -> Result<Vec<Task>, DeadlinerError> {
        self.store
            .list_tasks_for_owner(&owner_for_chat(chat_id))
            .await
    }
}

fn validate_name(name: &str) -> Result<String, DeadlinerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DeadlinerError::InvalidInput(
            "task name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DeadlinerError::InvalidInput(format!(
            "task name is longer than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn report(subject: &str, result: Result<ScheduleOutcome, DeadlinerError>) -> ReminderReport {
    match result {
        Ok(outcome) => ReminderReport::Ok(outcome),
        Err(e) => {
            warn!("tracker: reminder for '{subject}' not updated: {e}");
            ReminderReport::Warning(e.to_string())
        }
    }
}
