//! Submission facade used by request handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use eshop_core::{JobId, ProductId};
use eshop_products::ProductUpdate;

use crate::repository::ProductStore;

use super::queue::{BoundedQueue, QueueError};
use super::status::StatusTable;
use super::types::{Job, StatusRecord};
use super::worker::{UpdateWorker, UpdateWorkerHandle};

/// Cloneable handle over the update queue and its status table.
#[derive(Debug, Clone)]
pub struct ProductUpdateQueue {
    queue: Arc<BoundedQueue>,
    statuses: Arc<StatusTable>,
    worker_started: Arc<AtomicBool>,
}

impl Default for ProductUpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductUpdateQueue {
    pub fn new() -> Self {
        Self::with_queue(BoundedQueue::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_queue(BoundedQueue::with_capacity(capacity))
    }

    fn with_queue(queue: BoundedQueue) -> Self {
        Self {
            queue: Arc::new(queue),
            statuses: Arc::new(StatusTable::new()),
            worker_started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Accept a job. Waits while the queue is full.
    ///
    /// The `Queued` status is visible before the worker can see the job.
    /// Dropping the returned future before it resolves forgets the job: the
    /// status entry is removed and the job never reaches the worker.
    pub async fn submit(&self, job: Job) -> Result<JobId, QueueError> {
        let job_id = job.job_id();
        let entry = QueuedEntry::register(&self.statuses, job_id);
        self.queue.enqueue(job).await?;
        entry.keep();
        debug!(job_id = %job_id, pending = self.queue.size(), "job queued");
        Ok(job_id)
    }

    pub async fn submit_full_update(
        &self,
        product_id: ProductId,
        fields: ProductUpdate,
    ) -> Result<JobId, QueueError> {
        self.submit(Job::full_update(product_id, fields)).await
    }

    pub async fn submit_quantity_delta(
        &self,
        product_id: ProductId,
        delta: i64,
    ) -> Result<JobId, QueueError> {
        self.submit(Job::quantity_delta(product_id, delta)).await
    }

    /// Current status of a job; a terminal status is returned only once.
    pub fn poll_status(&self, job_id: JobId) -> Option<StatusRecord> {
        self.statuses.poll(job_id)
    }

    /// Jobs waiting in the queue.
    pub fn pending(&self) -> usize {
        self.queue.size()
    }

    /// Stop accepting jobs. Already queued jobs still run.
    pub fn close(&self) {
        self.queue.close();
    }

    /// Start the one worker for this queue.
    pub fn spawn_worker(
        &self,
        store: Arc<dyn ProductStore>,
    ) -> Result<UpdateWorkerHandle, QueueError> {
        if self.worker_started.swap(true, Ordering::SeqCst) {
            return Err(QueueError::WorkerAlreadyRunning);
        }
        Ok(UpdateWorker::new(self.queue.clone(), self.statuses.clone(), store).spawn())
    }
}

/// A `Queued` status entry that is removed again unless `keep` is called.
struct QueuedEntry<'a> {
    statuses: &'a StatusTable,
    job_id: JobId,
    kept: bool,
}

impl<'a> QueuedEntry<'a> {
    fn register(statuses: &'a StatusTable, job_id: JobId) -> Self {
        statuses.insert_queued(job_id);
        Self {
            statuses,
            job_id,
            kept: false,
        }
    }

    fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for QueuedEntry<'_> {
    fn drop(&mut self) {
        if !self.kept {
            self.statuses.remove(self.job_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use eshop_products::{Product, messages};

    use crate::jobs::queue::QUEUE_CAPACITY;
    use crate::jobs::types::JobState;
    use crate::repository::InMemoryProductStore;

    fn product(id: i64, quantity: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Test Name {id}"),
            main_image_url: format!("Test Image {id}"),
            price: 10_000,
            description: String::new(),
            quantity,
        }
    }

    async fn wait_terminal(queue: &ProductUpdateQueue, job_id: JobId) -> StatusRecord {
        for _ in 0..200 {
            if let Some(status) = queue.poll_status(job_id) {
                if status.is_terminal() {
                    return status;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {job_id} never reached a terminal state");
    }

    #[tokio::test]
    async fn submitted_job_is_immediately_queued() {
        let queue = ProductUpdateQueue::new();
        let job_id = queue.submit_quantity_delta(ProductId::new(1), 1).await.unwrap();

        assert_eq!(queue.poll_status(job_id).unwrap().state, JobState::Queued);
        assert_eq!(queue.pending(), 1);
    }

    #[tokio::test]
    async fn successful_delta_is_reported_once() {
        let store = InMemoryProductStore::with_products(vec![product(7, 50)]);
        let queue = ProductUpdateQueue::new();
        let worker = queue.spawn_worker(Arc::new(store.clone())).unwrap();

        let job_id = queue.submit_quantity_delta(ProductId::new(7), -20).await.unwrap();
        let status = wait_terminal(&queue, job_id).await;

        assert_eq!(status, StatusRecord::completed());
        assert_eq!(store.get(ProductId::new(7)).unwrap().quantity, 30);
        assert!(queue.poll_status(job_id).is_none());
        worker.shutdown().await;
    }

    #[tokio::test]
    async fn infeasible_delta_and_missing_product_fail() {
        let store = InMemoryProductStore::with_products(vec![product(7, 50)]);
        let queue = ProductUpdateQueue::new();
        let worker = queue.spawn_worker(Arc::new(store.clone())).unwrap();

        let too_much = queue.submit_quantity_delta(ProductId::new(7), -1000).await.unwrap();
        let missing = queue.submit_quantity_delta(ProductId::new(999), 1).await.unwrap();

        let status = wait_terminal(&queue, too_much).await;
        assert_eq!(status.state, JobState::Failed);
        assert!(status.message.contains("greater than or equal to zero"));
        assert_eq!(wait_terminal(&queue, missing).await, StatusRecord::failed(messages::NOT_FOUND));
        assert_eq!(store.get(ProductId::new(7)).unwrap().quantity, 50);
        worker.shutdown().await;
    }

    #[tokio::test]
    async fn persistence_failure_is_reported_as_internal_error() {
        let store = InMemoryProductStore::with_products(vec![product(1, 1)]);
        store.fail_commits(true);
        let queue = ProductUpdateQueue::new();
        let worker = queue.spawn_worker(Arc::new(store.clone())).unwrap();

        let job_id = queue
            .submit_full_update(
                ProductId::new(1),
                ProductUpdate {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            wait_terminal(&queue, job_id).await,
            StatusRecord::failed(messages::INTERNAL_ERROR)
        );
        assert_eq!(store.get(ProductId::new(1)).unwrap().name, "Test Name 1");
        worker.shutdown().await;
    }

    #[tokio::test]
    async fn submission_waits_while_the_queue_is_full() {
        let store = InMemoryProductStore::with_products(vec![product(1, 0)]);
        let queue = ProductUpdateQueue::with_capacity(3);
        for _ in 0..3 {
            queue.submit_quantity_delta(ProductId::new(1), 1).await.unwrap();
        }

        let blocked = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.submit_quantity_delta(ProductId::new(1), 1).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!blocked.is_finished());
        assert_eq!(queue.pending(), 3);

        let worker = queue.spawn_worker(Arc::new(store.clone())).unwrap();
        let fourth = tokio::time::timeout(Duration::from_secs(1), blocked)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        wait_terminal(&queue, fourth).await;
        worker.shutdown().await;
        assert_eq!(store.get(ProductId::new(1)).unwrap().quantity, 4);
    }

    #[tokio::test]
    async fn default_queue_holds_a_hundred_jobs_before_waiting() {
        let queue = ProductUpdateQueue::new();
        for _ in 0..QUEUE_CAPACITY {
            queue.submit_quantity_delta(ProductId::new(1), 1).await.unwrap();
        }
        assert_eq!(queue.pending(), 100);

        let blocked = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.submit_quantity_delta(ProductId::new(1), 1).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!blocked.is_finished());
        assert_eq!(queue.pending(), 100);

        let store = InMemoryProductStore::with_products(vec![product(1, 0)]);
        let worker = queue.spawn_worker(Arc::new(store.clone())).unwrap();
        let last = tokio::time::timeout(Duration::from_secs(1), blocked)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        worker.shutdown().await;
        assert_eq!(queue.poll_status(last).unwrap(), StatusRecord::completed());
        assert_eq!(store.get(ProductId::new(1)).unwrap().quantity, 101);
    }

    #[tokio::test]
    async fn abandoned_submission_leaves_no_status_behind() {
        let store = InMemoryProductStore::with_products(vec![product(1, 0)]);
        let queue = ProductUpdateQueue::with_capacity(1);
        let first = queue.submit_quantity_delta(ProductId::new(1), 1).await.unwrap();

        let abandoned = Job::quantity_delta(ProductId::new(1), 1);
        let abandoned_id = abandoned.job_id();
        let waited = tokio::time::timeout(Duration::from_millis(50), queue.submit(abandoned)).await;
        assert!(waited.is_err(), "submit should still be waiting for a free slot");
        assert!(queue.poll_status(abandoned_id).is_none());

        let worker = queue.spawn_worker(Arc::new(store.clone())).unwrap();
        let stats = worker.shutdown().await;

        assert_eq!(stats.jobs_processed, 1);
        assert_eq!(queue.poll_status(first).unwrap(), StatusRecord::completed());
        assert!(queue.poll_status(abandoned_id).is_none());
        assert_eq!(store.get(ProductId::new(1)).unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn closed_queue_rejects_and_forgets_the_job() {
        let queue = ProductUpdateQueue::new();
        queue.close();

        let job = Job::quantity_delta(ProductId::new(1), 1);
        let job_id = job.job_id();

        assert_eq!(queue.submit(job).await, Err(QueueError::Closed));
        assert!(queue.poll_status(job_id).is_none());
    }

    #[tokio::test]
    async fn only_one_worker_may_run() {
        let queue = ProductUpdateQueue::new();
        let store: Arc<dyn ProductStore> = Arc::new(InMemoryProductStore::new());

        let worker = queue.spawn_worker(store.clone()).unwrap();
        assert!(matches!(
            queue.spawn_worker(store),
            Err(QueueError::WorkerAlreadyRunning)
        ));
        worker.shutdown().await;
    }

    #[tokio::test]
    async fn concurrent_producers_all_get_processed() {
        let store = InMemoryProductStore::with_products(vec![product(1, 0)]);
        let queue = ProductUpdateQueue::new();
        let worker = queue.spawn_worker(Arc::new(store.clone())).unwrap();

        let producers: Vec<_> = (0..8)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    let mut ids = Vec::new();
                    for _ in 0..50 {
                        ids.push(queue.submit_quantity_delta(ProductId::new(1), 1).await.unwrap());
                    }
                    ids
                })
            })
            .collect();

        let mut ids = Vec::new();
        for p in producers {
            ids.extend(p.await.unwrap());
        }
        let stats = worker.shutdown().await;

        assert_eq!(stats.jobs_completed, 400);
        assert_eq!(store.get(ProductId::new(1)).unwrap().quantity, 400);
        for id in ids {
            assert_eq!(queue.poll_status(id).unwrap(), StatusRecord::completed());
        }
    }
}
