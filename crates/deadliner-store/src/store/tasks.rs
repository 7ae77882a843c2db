//! Task CRUD and the reminder-sent marker.

use super::{format_ts, parse_ts, Store};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadliner_core::{
    error::DeadlinerError,
    task::{Category, NewTask, Task, TaskChanges},
    traits::TaskSource,
};
use uuid::Uuid;

const TASK_COLUMNS: &str = "t.id, t.name, t.description, t.deadline, t.owner, t.created_at, \
     t.reminder_sent_at, c.id, c.name, c.created_at \
     FROM tasks t LEFT JOIN categories c ON c.id = t.category_id";

/// (id, name, description, deadline, owner, created_at, reminder_sent_at,
///  category id, category name, category created_at)
type TaskRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
);

impl Store {
    /// Insert a new task. Task names are unique.
    pub async fn create_task(&self, new: &NewTask) -> Result<Task, DeadlinerError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO tasks (id, name, description, deadline, owner, category_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(format_ts(new.deadline))
        .bind(&new.owner)
        .bind(new.category_id)
        .bind(format_ts(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("create task", &new.name, e))?;

        self.get_task(&id)
            .await?
            .ok_or_else(|| DeadlinerError::NotFound(format!("task {id} vanished after insert")))
    }

    /// Fetch a task by id.
    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, DeadlinerError> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} WHERE t.id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DeadlinerError::Store(format!("get task failed: {e}")))?;

        row.map(task_from_row).transpose()
    }

    /// Tasks belonging to an owner, soonest deadline first.
    pub async fn list_tasks_for_owner(&self, owner: &str) -> Result<Vec<Task>, DeadlinerError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} WHERE t.owner = ? ORDER BY t.deadline ASC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DeadlinerError::Store(format!("list tasks failed: {e}")))?;

        rows.into_iter().map(task_from_row).collect()
    }

    /// Apply a partial update. Returns the updated task, or `None` if the
    /// task does not exist.
    ///
    /// Moving the deadline to a different value after `now` clears the
    /// reminder-sent marker, so the new deadline gets its own reminder.
    pub async fn update_task(
        &self,
        id: &str,
        changes: &TaskChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, DeadlinerError> {
        let Some(current) = self.get_task(id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(current));
        }

        let mut sets = Vec::new();
        let mut values: Vec<Option<String>> = Vec::new();

        if let Some(ref name) = changes.name {
            sets.push("name = ?");
            values.push(Some(name.clone()));
        }
        if let Some(ref description) = changes.description {
            sets.push("description = ?");
            values.push(Some(description.clone()));
        }
        if let Some(deadline) = changes.deadline {
            sets.push("deadline = ?");
            values.push(Some(format_ts(deadline)));
            if format_ts(deadline) != format_ts(current.deadline) && deadline > now {
                sets.push("reminder_sent_at = NULL");
            }
        }
        if let Some(category_id) = changes.category_id {
            sets.push("category_id = ?");
            values.push(category_id.map(|c| c.to_string()));
        }

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        for v in &values {
            query = query.bind(v);
        }
        query
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("update task", changes.name.as_deref().unwrap_or(id), e))?;

        self.get_task(id).await
    }

    /// Delete a task. Returns `true` if a row was removed.
    pub async fn delete_task(&self, id: &str) -> Result<bool, DeadlinerError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DeadlinerError::Store(format!("delete task failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Record that a reminder was delivered for the task's current deadline.
    pub async fn mark_reminder_sent(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DeadlinerError> {
        sqlx::query("UPDATE tasks SET reminder_sent_at = ? WHERE id = ?")
            .bind(format_ts(at))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DeadlinerError::Store(format!("mark reminder sent failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl TaskSource for Store {
    async fn task_by_id(&self, task_id: &str) -> Result<Option<Task>, DeadlinerError> {
        self.get_task(task_id).await
    }

    async fn mark_reminder_sent(
        &self,
        task_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DeadlinerError> {
        Store::mark_reminder_sent(self, task_id, at).await
    }
}

fn task_from_row(row: TaskRow) -> Result<Task, DeadlinerError> {
    let (
        id,
        name,
        description,
        deadline,
        owner,
        created_at,
        reminder_sent_at,
        category_id,
        category_name,
        category_created_at,
    ) = row;

    let category = match (category_id, category_name, category_created_at) {
        (Some(id), Some(name), Some(created_at)) => Some(Category {
            id,
            name,
            created_at: parse_ts(&created_at)?,
        }),
        _ => None,
    };

    Ok(Task {
        id,
        name,
        description,
        deadline: parse_ts(&deadline)?,
        owner,
        category,
        created_at: parse_ts(&created_at)?,
        reminder_sent_at: reminder_sent_at.as_deref().map(parse_ts).transpose()?,
    })
}

/// Map a write failure, surfacing unique-name conflicts as invalid input.
fn write_error(action: &str, name: &str, e: sqlx::Error) -> DeadlinerError {
    let unique = e
        .as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false);
    if unique {
        DeadlinerError::InvalidInput(format!("a task named '{name}' already exists"))
    } else {
        DeadlinerError::Store(format!("{action} failed: {e}"))
    }
}
