//! Job handle store: which deferred job is outstanding for each task.
//!
//! Rows live until explicitly deleted; nothing here expires.

use super::Store;
use async_trait::async_trait;
use deadliner_core::{error::DeadlinerError, traits::HandleStore};

#[async_trait]
impl HandleStore for Store {
    async fn get_handle(&self, task_id: &str) -> Result<Option<String>, DeadlinerError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT job_id FROM reminder_handles WHERE task_id = ?")
                .bind(task_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DeadlinerError::Store(format!("get handle failed: {e}")))?;
        Ok(row.map(|(job_id,)| job_id))
    }

    async fn set_handle(&self, task_id: &str, job_id: &str) -> Result<(), DeadlinerError> {
        sqlx::query(
            "INSERT INTO reminder_handles (task_id, job_id, updated_at) \
             VALUES (?, ?, datetime('now')) \
             ON CONFLICT(task_id) DO UPDATE SET job_id = excluded.job_id, \
             updated_at = excluded.updated_at",
        )
        .bind(task_id)
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DeadlinerError::Store(format!("set handle failed: {e}")))?;
        Ok(())
    }

    async fn delete_handle(&self, task_id: &str) -> Result<bool, DeadlinerError> {
        let result = sqlx::query("DELETE FROM reminder_handles WHERE task_id = ?")
            .bind(task_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DeadlinerError::Store(format!("delete handle failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}

impl Store {
    /// Number of tasks with an outstanding job handle.
    pub async fn count_handles(&self) -> Result<i64, DeadlinerError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reminder_handles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DeadlinerError::Store(format!("count handles failed: {e}")))?;
        Ok(count)
    }
}
