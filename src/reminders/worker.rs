//! Background worker: claims due jobs from the queue and runs them.

use super::dispatcher::{DispatchOutcome, ReminderDispatcher};
use deadliner_core::{error::DeadlinerError, traits::Clock};
use deadliner_store::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Finished jobs are purged once every this many polls.
const PURGE_EVERY_TICKS: u64 = 240;

/// Polls the job queue and hands due jobs to the dispatcher.
pub struct ReminderWorker {
    store: Store,
    dispatcher: Arc<ReminderDispatcher>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    batch_size: u32,
    requeue_interrupted: bool,
    job_retention: chrono::Duration,
}

impl ReminderWorker {
    pub fn new(
        store: Store,
        dispatcher: Arc<ReminderDispatcher>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
        batch_size: u32,
    ) -> Self {
        Self {
            store,
            dispatcher,
            clock,
            poll_interval,
            batch_size: batch_size.max(1),
            requeue_interrupted: true,
            job_retention: chrono::Duration::days(7),
        }
    }

    pub fn with_requeue_interrupted(mut self, requeue: bool) -> Self {
        self.requeue_interrupted = requeue;
        self
    }

    /// How long `done` and `cancelled` jobs are kept.
    pub fn with_job_retention(mut self, retention: chrono::Duration) -> Self {
        self.job_retention = retention;
        self
    }

    /// Run until `shutdown` flips to `true` (or its sender is dropped).
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if self.requeue_interrupted {
            if let Err(e) = self.store.requeue_interrupted_jobs().await {
                error!("reminder worker: failed to re-queue interrupted jobs: {e}");
            }
        }
        self.purge_finished().await;
        info!(
            "reminder worker started (poll every {}s, batch {})",
            self.poll_interval.as_secs(),
            self.batch_size
        );

        let mut polls: u64 = 0;
        loop {
            match self.tick().await {
                Ok(0) => {}
                Ok(n) => info!("reminder worker: processed {n} job(s)"),
                Err(e) => error!("reminder worker: poll failed: {e}"),
            }
            polls += 1;
            if polls % PURGE_EVERY_TICKS == 0 {
                self.purge_finished().await;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("reminder worker stopped");
    }

    /// Drop finished and cancelled jobs older than the retention window.
    /// Returns how many were removed; failures are logged.
    pub async fn purge_finished(&self) -> u64 {
        let cutoff = self.clock.now() - self.job_retention;
        match self.store.purge_finished_jobs(cutoff).await {
            Ok(0) => 0,
            Ok(n) => {
                info!("reminder worker: purged {n} finished job(s)");
                n
            }
            Err(e) => {
                warn!("reminder worker: failed to purge finished jobs: {e}");
                0
            }
        }
    }

    /// Claim and run one batch of due jobs. Returns how many were run.
    pub async fn tick(&self) -> Result<usize, DeadlinerError> {
        let jobs = self
            .store
            .claim_due_jobs(self.clock.now(), self.batch_size)
            .await?;
        if jobs.is_empty() {
            return Ok(0);
        }

        let mut set = JoinSet::new();
        for job in jobs {
            let dispatcher = self.dispatcher.clone();
            set.spawn(async move {
                let outcome = dispatcher.dispatch(&job).await;
                (job, outcome)
            });
        }

        let mut processed = 0;
        while let Some(joined) = set.join_next().await {
            let (job, outcome) = match joined {
                Ok(result) => result,
                Err(e) => {
                    // The job stays `running` and is re-queued on next start.
                    error!("reminder worker: dispatch task panicked: {e}");
                    continue;
                }
            };
            if let DispatchOutcome::Failed(ref reason) = outcome {
                warn!("reminder worker: job {} failed: {reason}", job.id);
            }
            if let Err(e) = self.store.finish_job(&job.id, &outcome.label()).await {
                error!("reminder worker: failed to finish job {}: {e}", job.id);
            }
            processed += 1;
        }
        Ok(processed)
    }
}
