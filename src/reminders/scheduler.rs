//! Translate task lifecycle events into deferred-job operations.

use deadliner_core::{
    error::DeadlinerError,
    job::CancelOutcome,
    task::Task,
    traits::{Clock, HandleStore, JobQueue},
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Why a scheduling call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The owner reference carries no usable chat id.
    NoOwner,
    /// The deadline is not in the future.
    DeadlinePassed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOwner => f.write_str("no messaging identity"),
            Self::DeadlinePassed => f.write_str("deadline already passed"),
        }
    }
}

/// What a scheduling call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A new job is outstanding. `replaced` is true when a pending job was
    /// cancelled to make room for it.
    Scheduled { job_id: String, replaced: bool },
    /// Any outstanding job was cancelled and the handle removed.
    Cleared { cancelled: bool },
    Skipped(SkipReason),
}

impl fmt::Display for ScheduleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled {
                job_id,
                replaced: true,
            } => write!(f, "rescheduled as job {job_id}"),
            Self::Scheduled { job_id, .. } => write!(f, "scheduled as job {job_id}"),
            Self::Cleared { cancelled: true } => f.write_str("pending reminder cancelled"),
            Self::Cleared { cancelled: false } => f.write_str("no pending reminder"),
            Self::Skipped(reason) => write!(f, "not scheduled: {reason}"),
        }
    }
}

/// Decides, per task event, whether to cancel, schedule, or do nothing.
///
/// Every path that schedules first cancels the outstanding job, so a task
/// never has two live jobs.
#[derive(Clone)]
pub struct ReminderScheduler {
    queue: Arc<dyn JobQueue>,
    handles: Arc<dyn HandleStore>,
    clock: Arc<dyn Clock>,
}

impl ReminderScheduler {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        handles: Arc<dyn HandleStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            queue,
            handles,
            clock,
        }
    }

    /// A task was created.
    pub async fn on_task_created(&self, task: &Task) -> Result<ScheduleOutcome, DeadlinerError> {
        if task.chat_id().is_none() {
            info!("reminders: task '{}' has no messaging identity, skipping", task.name);
            return Ok(ScheduleOutcome::Skipped(SkipReason::NoOwner));
        }
        if task.deadline <= self.clock.now() {
            info!(
                "reminders: deadline of task '{}' already passed, not scheduling",
                task.name
            );
            return Ok(ScheduleOutcome::Skipped(SkipReason::DeadlinePassed));
        }
        self.reschedule(task).await
    }

    /// A task was updated. Reschedules unconditionally, even when the
    /// deadline itself did not change.
    pub async fn on_task_updated(&self, task: &Task) -> Result<ScheduleOutcome, DeadlinerError> {
        if task.chat_id().is_none() {
            info!("reminders: task '{}' has no messaging identity, skipping", task.name);
            return Ok(ScheduleOutcome::Skipped(SkipReason::NoOwner));
        }
        if task.deadline <= self.clock.now() {
            info!(
                "reminders: deadline of task '{}' moved into the past, dropping reminder",
                task.name
            );
            return self.on_deadline_passed_cleanup(task).await;
        }
        self.reschedule(task).await
    }

    /// The task's deadline is observed to be in the past.
    pub async fn on_deadline_passed_cleanup(
        &self,
        task: &Task,
    ) -> Result<ScheduleOutcome, DeadlinerError> {
        self.clear(&task.id).await
    }

    /// A task was deleted.
    pub async fn on_task_deleted(&self, task_id: &str) -> Result<ScheduleOutcome, DeadlinerError> {
        self.clear(task_id).await
    }

    /// Cancel whatever is outstanding, schedule at the task's deadline, and
    /// record the new handle.
    async fn reschedule(&self, task: &Task) -> Result<ScheduleOutcome, DeadlinerError> {
        let replaced = self.cancel_outstanding(&task.id).await?;
        let job_id = self.queue.schedule(&task.id, task.deadline).await?;
        self.handles.set_handle(&task.id, &job_id).await?;

        info!(
            "reminders: scheduled reminder for task '{}' at {} (job {job_id})",
            task.name, task.deadline
        );
        Ok(ScheduleOutcome::Scheduled { job_id, replaced })
    }

    async fn clear(&self, task_id: &str) -> Result<ScheduleOutcome, DeadlinerError> {
        let cancelled = self.cancel_outstanding(task_id).await?;
        Ok(ScheduleOutcome::Cleared { cancelled })
    }

    /// Cancel the task's outstanding job, if any, and delete its handle.
    /// Returns whether a pending job was actually cancelled.
    async fn cancel_outstanding(&self, task_id: &str) -> Result<bool, DeadlinerError> {
        let Some(job_id) = self.handles.get_handle(task_id).await? else {
            return Ok(false);
        };

        let cancelled = match self.queue.cancel(&job_id).await? {
            CancelOutcome::Cancelled => {
                debug!("reminders: cancelled job {job_id} for task {task_id}");
                true
            }
            CancelOutcome::NothingToCancel => {
                // Fired, cancelled elsewhere, or never known to the queue.
                info!("reminders: job {job_id} for task {task_id} already gone, dropping stale handle");
                false
            }
        };
        self.handles.delete_handle(task_id).await?;
        Ok(cancelled)
    }
}
