//! Deferred reminder jobs.

use chrono::{DateTime, Utc};

/// Result of asking the queue to cancel a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The job was pending and will never run.
    Cancelled,
    /// The job already ran, was already cancelled, or never existed.
    NothingToCancel,
}

/// Lifecycle state of a deferred job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A job claimed by a worker for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueJob {
    pub id: String,
    pub task_id: String,
    /// The deadline the job was scheduled for.
    pub run_at: DateTime<Utc>,
}

/// Full job record, for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub id: String,
    pub task_id: String,
    pub run_at: DateTime<Utc>,
    pub status: JobStatus,
    pub outcome: Option<String>,
}
