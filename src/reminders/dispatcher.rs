//! Fire-time callback: re-validate a due job against the live task and
//! deliver the reminder.

use crate::i18n;
use chrono::Duration;
use chrono_tz::Tz;
use deadliner_core::{
    error::DeadlinerError,
    job::DueJob,
    traits::{Clock, HandleStore, Notifier, TaskSource},
};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Why a due job ended without sending anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchSkip {
    /// The task was deleted after the job was scheduled.
    TaskMissing,
    /// The owner reference carries no usable chat id.
    NoOwner,
    /// The task's live handle names a different job (or none).
    Superseded,
    /// The deadline was pushed into the future after scheduling.
    DeadlineMoved,
    /// The deadline no longer matches the time the job was scheduled for.
    Stale,
    /// A reminder already went out for this deadline.
    AlreadySent,
}

impl fmt::Display for DispatchSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TaskMissing => "task_missing",
            Self::NoOwner => "no_owner",
            Self::Superseded => "superseded",
            Self::DeadlineMoved => "deadline_moved",
            Self::Stale => "stale",
            Self::AlreadySent => "already_sent",
        })
    }
}

/// Terminal result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Skipped(DispatchSkip),
    Failed(String),
}

impl DispatchOutcome {
    /// Short label recorded on the finished job.
    pub fn label(&self) -> String {
        match self {
            Self::Sent => "sent".to_string(),
            Self::Skipped(skip) => format!("skipped:{skip}"),
            Self::Failed(_) => "failed".to_string(),
        }
    }
}

/// Executes due reminder jobs.
pub struct ReminderDispatcher {
    tasks: Arc<dyn TaskSource>,
    handles: Arc<dyn HandleStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    language: String,
    tolerance: Duration,
    clear_handle_on_failure: bool,
}

impl ReminderDispatcher {
    pub fn new(
        tasks: Arc<dyn TaskSource>,
        handles: Arc<dyn HandleStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tasks,
            handles,
            notifier,
            clock,
            timezone: chrono_tz::UTC,
            language: "English".to_string(),
            tolerance: Duration::seconds(60),
            clear_handle_on_failure: true,
        }
    }

    /// Render dates in `timezone` and text in `language`.
    pub fn with_locale(mut self, timezone: Tz, language: &str) -> Self {
        self.timezone = timezone;
        self.language = language.to_string();
        self
    }

    /// Allowed drift between a job's `run_at` and the task deadline.
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Whether a failed send drops the handle (no automatic retry).
    pub fn with_clear_handle_on_failure(mut self, clear: bool) -> Self {
        self.clear_handle_on_failure = clear;
        self
    }

    /// Run one due job. Never fails: every error ends up in the log and in
    /// [`DispatchOutcome::Failed`].
    pub async fn dispatch(&self, job: &DueJob) -> DispatchOutcome {
        match self.try_dispatch(job).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    "reminders: dispatch of job {} for task {} failed: {e}",
                    job.id, job.task_id
                );
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_dispatch(&self, job: &DueJob) -> Result<DispatchOutcome, DeadlinerError> {
        let Some(task) = self.tasks.task_by_id(&job.task_id).await? else {
            info!("reminders: task {} not found, dropping job {}", job.task_id, job.id);
            self.release_handle(job).await?;
            return Ok(DispatchOutcome::Skipped(DispatchSkip::TaskMissing));
        };

        let Some(chat_id) = task.chat_id() else {
            info!(
                "reminders: task '{}' has no valid messaging identity ({:?})",
                task.name, task.owner
            );
            self.release_handle(job).await?;
            return Ok(DispatchOutcome::Skipped(DispatchSkip::NoOwner));
        };

        let live = self.handles.get_handle(&task.id).await?;
        if live.as_deref() != Some(job.id.as_str()) {
            info!(
                "reminders: job {} for task '{}' was superseded, skipping",
                job.id, task.name
            );
            return Ok(DispatchOutcome::Skipped(DispatchSkip::Superseded));
        }

        let now = self.clock.now();
        if task.deadline > now {
            // The scheduler owns the job for the new deadline.
            info!(
                "reminders: deadline of task '{}' moved to {}, skipping job {}",
                task.name, task.deadline, job.id
            );
            return Ok(DispatchOutcome::Skipped(DispatchSkip::DeadlineMoved));
        }

        if (task.deadline - job.run_at).abs() > self.tolerance {
            info!(
                "reminders: job {} was scheduled for {} but task '{}' is due {}, skipping",
                job.id, job.run_at, task.name, task.deadline
            );
            self.release_handle(job).await?;
            return Ok(DispatchOutcome::Skipped(DispatchSkip::Stale));
        }

        if task.reminder_sent_at.is_some() {
            info!("reminders: reminder for task '{}' already sent", task.name);
            self.release_handle(job).await?;
            return Ok(DispatchOutcome::Skipped(DispatchSkip::AlreadySent));
        }

        let text = i18n::reminder_message(&self.language, &task, self.timezone);
        match self.notifier.send(chat_id, &text).await {
            Ok(()) => {
                info!(
                    "reminders: sent reminder for task '{}' to chat {chat_id} via {}",
                    task.name,
                    self.notifier.name()
                );
                self.tasks.mark_reminder_sent(&task.id, now).await?;
                self.release_handle(job).await?;
                Ok(DispatchOutcome::Sent)
            }
            Err(e) => {
                warn!(
                    "reminders: {} failed to deliver reminder for task '{}': {e}",
                    self.notifier.name(),
                    task.name
                );
                if self.clear_handle_on_failure {
                    self.release_handle(job).await?;
                }
                Ok(DispatchOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Delete the task's handle if it still names this job.
    async fn release_handle(&self, job: &DueJob) -> Result<(), DeadlinerError> {
        if self.handles.get_handle(&job.task_id).await?.as_deref() == Some(job.id.as_str()) {
            self.handles.delete_handle(&job.task_id).await?;
        }
        Ok(())
    }
}
