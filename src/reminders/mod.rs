//! Reminder scheduling. Keeps exactly one deferred job per task with a
//! future deadline, and delivers it when the deadline arrives.
//!
//! - `scheduler`: reacts to task create/update/delete
//! - `dispatcher`: runs at fire time, re-validates, sends
//! - `worker`: polls the job queue and hands due jobs to the dispatcher

mod dispatcher;
mod scheduler;
mod worker;


pub use dispatcher::{DispatchOutcome, DispatchSkip, ReminderDispatcher};
pub use scheduler::{ReminderScheduler, ScheduleOutcome, SkipReason};
pub use worker::ReminderWorker;
