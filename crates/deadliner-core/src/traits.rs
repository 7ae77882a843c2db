use crate::{error::DeadlinerError, job::CancelOutcome, task::Task};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Deferred job queue. Runs a reminder for a task at (or after) a time.
///
/// Implementations must be externally durable so that jobs survive a
/// restart of the process that scheduled them.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Schedule a reminder job for `task_id` at `run_at`. Returns the job id.
    async fn schedule(&self, task_id: &str, run_at: DateTime<Utc>)
        -> Result<String, DeadlinerError>;

    /// Cancel a job. Idempotent: a job that already ran or is unknown
    /// yields [`CancelOutcome::NothingToCancel`].
    async fn cancel(&self, job_id: &str) -> Result<CancelOutcome, DeadlinerError>;
}

/// Durable `task id -> outstanding job id` mapping. No expiry.
#[async_trait]
pub trait HandleStore: Send + Sync {
    async fn get_handle(&self, task_id: &str) -> Result<Option<String>, DeadlinerError>;

    /// Insert or replace the handle for a task.
    async fn set_handle(&self, task_id: &str, job_id: &str) -> Result<(), DeadlinerError>;

    /// Remove the handle. Returns `true` if one existed.
    async fn delete_handle(&self, task_id: &str) -> Result<bool, DeadlinerError>;
}

/// Read-back access to the task store, used at fire time.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn task_by_id(&self, task_id: &str) -> Result<Option<Task>, DeadlinerError>;

    /// Record a delivered reminder. Must not trigger any scheduling.
    async fn mark_reminder_sent(
        &self,
        task_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DeadlinerError>;
}

/// Notification gateway. Delivers text to a user's chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable gateway name.
    fn name(&self) -> &str;

    /// Send `text` to `chat_id`.
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeadlinerError>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
