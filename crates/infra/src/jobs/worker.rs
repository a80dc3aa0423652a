//! The single background worker that drains the update queue.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::repository::ProductStore;

use super::executor::execute;
use super::queue::{BoundedQueue, Dequeued};
use super::shutdown::{ShutdownSignal, ShutdownTrigger};
use super::status::StatusTable;
use super::types::{Job, JobState, StatusRecord};

/// Worker runtime statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct WorkerStats {
    pub jobs_processed: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    /// Jobs executed after the stop signal was observed.
    pub drained_on_shutdown: u64,
}

/// Handle to control a running worker.
#[derive(Debug)]
pub struct UpdateWorkerHandle {
    shutdown: ShutdownTrigger,
    join: JoinHandle<()>,
    stats: Arc<Mutex<WorkerStats>>,
}

impl UpdateWorkerHandle {
    /// Request graceful shutdown and wait until every queued job has run.
    pub async fn shutdown(self) -> WorkerStats {
        let Self {
            shutdown,
            join,
            stats,
        } = self;
        shutdown.raise();
        if let Err(e) = join.await {
            error!(error = %e, "update worker task ended abnormally");
        }
        let stats = stats.lock().unwrap_or_else(PoisonError::into_inner).clone();
        stats
    }

    /// Get current worker statistics.
    pub fn stats(&self) -> WorkerStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Background worker.
///
/// Takes jobs from the queue one at a time, applies them to the store and
/// records the outcome in the status table. Execution is strictly sequential.
pub struct UpdateWorker {
    queue: Arc<BoundedQueue>,
    statuses: Arc<StatusTable>,
    store: Arc<dyn ProductStore>,
}

impl UpdateWorker {
    pub fn new(
        queue: Arc<BoundedQueue>,
        statuses: Arc<StatusTable>,
        store: Arc<dyn ProductStore>,
    ) -> Self {
        Self {
            queue,
            statuses,
            store,
        }
    }

    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(self) -> UpdateWorkerHandle {
        let (trigger, signal) = ShutdownSignal::pair();
        let stats = Arc::new(Mutex::new(WorkerStats::default()));
        let join = tokio::spawn(self.run(signal, stats.clone()));

        UpdateWorkerHandle {
            shutdown: trigger,
            join,
            stats,
        }
    }

    async fn run(self, mut shutdown: ShutdownSignal, stats: Arc<Mutex<WorkerStats>>) {
        info!("update worker started");

        loop {
            match self.queue.dequeue(&mut shutdown).await {
                Dequeued::Job(job) => self.process(&job, &stats, false).await,
                Dequeued::Cancelled => break,
            }
        }

        let pending = self.queue.size();
        if pending > 0 {
            info!(pending, "draining update queue");
        }
        while let Some(job) = self.queue.try_dequeue() {
            self.process(&job, &stats, true).await;
        }

        info!(stats = ?self.snapshot(&stats), "update worker stopped");
    }

    async fn process(&self, job: &Job, stats: &Mutex<WorkerStats>, draining: bool) {
        let job_id = job.job_id();
        debug!(job_id = %job_id, kind = job.kind(), "processing job");
        self.statuses.set(job_id, StatusRecord::processing());

        let outcome = execute(self.store.as_ref(), job).await;
        let state = outcome.state;
        self.statuses.set(job_id, outcome);

        let mut s = stats.lock().unwrap_or_else(PoisonError::into_inner);
        s.jobs_processed += 1;
        match state {
            JobState::Completed => s.jobs_completed += 1,
            _ => s.jobs_failed += 1,
        }
        if draining {
            s.drained_on_shutdown += 1;
        }
    }

    fn snapshot(&self, stats: &Mutex<WorkerStats>) -> WorkerStats {
        stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
