//! Deferred reminder job queue.
//!
//! Jobs move `pending → running → done`, or `pending → cancelled`. Claiming
//! is a conditional update, so two workers sharing the database never run
//! the same job.

use super::{format_ts, parse_ts, Store};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadliner_core::{
    error::DeadlinerError,
    job::{CancelOutcome, DueJob, JobRecord, JobStatus},
    traits::JobQueue,
};
use tracing::{debug, info};
use uuid::Uuid;

#[async_trait]
impl JobQueue for Store {
    async fn schedule(
        &self,
        task_id: &str,
        run_at: DateTime<Utc>,
    ) -> Result<String, DeadlinerError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO reminder_jobs (id, task_id, run_at, status) VALUES (?, ?, ?, 'pending')",
        )
        .bind(&id)
        .bind(task_id)
        .bind(format_ts(run_at))
        .execute(&self.pool)
        .await
        .map_err(|e| DeadlinerError::Queue(format!("schedule job failed: {e}")))?;

        debug!("queue: scheduled job {id} for task {task_id} at {run_at}");
        Ok(id)
    }

    async fn cancel(&self, job_id: &str) -> Result<CancelOutcome, DeadlinerError> {
        let result = sqlx::query(
            "UPDATE reminder_jobs SET status = 'cancelled', finished_at = datetime('now') \
             WHERE id = ? AND status = 'pending'",
        )
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DeadlinerError::Queue(format!("cancel job failed: {e}")))?;

        if result.rows_affected() > 0 {
            Ok(CancelOutcome::Cancelled)
        } else {
            Ok(CancelOutcome::NothingToCancel)
        }
    }
}

impl Store {
    /// Claim up to `limit` pending jobs whose time has come, oldest first.
    pub async fn claim_due_jobs(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<DueJob>, DeadlinerError> {
        let candidates: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT id, task_id, run_at FROM reminder_jobs \
             WHERE status = 'pending' AND run_at <= ? \
             ORDER BY run_at ASC LIMIT ?",
        )
        .bind(format_ts(now))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DeadlinerError::Queue(format!("find due jobs failed: {e}")))?;

        let mut claimed = Vec::with_capacity(candidates.len());
        for (id, task_id, run_at) in candidates {
            let result = sqlx::query(
                "UPDATE reminder_jobs SET status = 'running' WHERE id = ? AND status = 'pending'",
            )
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(|e| DeadlinerError::Queue(format!("claim job failed: {e}")))?;

            // Lost the race to a cancel or another worker.
            if result.rows_affected() == 0 {
                continue;
            }
            claimed.push(DueJob {
                id,
                task_id,
                run_at: parse_ts(&run_at)?,
            });
        }
        Ok(claimed)
    }

    /// Mark a claimed job as done, recording the dispatch outcome.
    pub async fn finish_job(&self, job_id: &str, outcome: &str) -> Result<(), DeadlinerError> {
        sqlx::query(
            "UPDATE reminder_jobs SET status = 'done', outcome = ?, finished_at = datetime('now') \
             WHERE id = ?",
        )
        .bind(outcome)
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DeadlinerError::Queue(format!("finish job failed: {e}")))?;
        Ok(())
    }

    /// Return jobs left `running` by a worker that died mid-dispatch to the
    /// pending state. Returns how many were re-queued.
    pub async fn requeue_interrupted_jobs(&self) -> Result<u64, DeadlinerError> {
        let result =
            sqlx::query("UPDATE reminder_jobs SET status = 'pending' WHERE status = 'running'")
                .execute(&self.pool)
                .await
                .map_err(|e| DeadlinerError::Queue(format!("requeue jobs failed: {e}")))?;

        let count = result.rows_affected();
        if count > 0 {
            info!("queue: re-queued {count} interrupted job(s)");
        }
        Ok(count)
    }

    /// Delete `done` and `cancelled` jobs that finished before `cutoff`.
    /// Pending and running jobs are never touched. Returns how many rows
    /// were removed.
    pub async fn purge_finished_jobs(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, DeadlinerError> {
        let result = sqlx::query(
            "DELETE FROM reminder_jobs \
             WHERE status IN ('done', 'cancelled') AND finished_at < ?",
        )
        .bind(format_ts(cutoff))
        .execute(&self.pool)
        .await
        .map_err(|e| DeadlinerError::Queue(format!("purge jobs failed: {e}")))?;

        let count = result.rows_affected();
        if count > 0 {
            debug!("queue: purged {count} finished job(s)");
        }
        Ok(count)
    }

    /// Fetch one job record.
    pub async fn job(&self, job_id: &str) -> Result<Option<JobRecord>, DeadlinerError> {
        let row: Option<(String, String, String, String, Option<String>)> = sqlx::query_as(
            "SELECT id, task_id, run_at, status, outcome FROM reminder_jobs WHERE id = ?",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DeadlinerError::Queue(format!("get job failed: {e}")))?;

        let Some((id, task_id, run_at, status, outcome)) = row else {
            return Ok(None);
        };
        let status = JobStatus::parse(&status)
            .ok_or_else(|| DeadlinerError::Queue(format!("job {id} has unknown status {status}")))?;

        Ok(Some(JobRecord {
            id,
            task_id,
            run_at: parse_ts(&run_at)?,
            status,
            outcome,
        }))
    }

    /// Number of jobs waiting to run.
    pub async fn count_pending_jobs(&self) -> Result<i64, DeadlinerError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reminder_jobs WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DeadlinerError::Queue(format!("count jobs failed: {e}")))?;
        Ok(count)
    }
}
