//! Test doubles for the core traits.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use deadliner_core::{
    config::StoreConfig,
    error::DeadlinerError,
    job::CancelOutcome,
    traits::{Clock, JobQueue, Notifier},
};
use deadliner_store::Store;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// `t0` used throughout the scenario tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
}

pub async fn memory_store() -> Store {
    Store::new(&StoreConfig {
        db_path: ":memory:".to_string(),
    })
    .await
    .unwrap()
}

/// A clock that only moves when told to.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Mutex::new(at))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.lock().unwrap() = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Records every notification; can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(i64, String)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeadlinerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeadlinerError::Gateway("gateway unreachable".to_string()));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

/// A job queue that is down.
pub struct UnavailableQueue;

#[async_trait]
impl JobQueue for UnavailableQueue {
    async fn schedule(
        &self,
        _task_id: &str,
        _run_at: DateTime<Utc>,
    ) -> Result<String, DeadlinerError> {
        Err(DeadlinerError::Queue("broker unavailable".to_string()))
    }

    async fn cancel(&self, _job_id: &str) -> Result<CancelOutcome, DeadlinerError> {
        Err(DeadlinerError::Queue("broker unavailable".to_string()))
    }
}
