//! Bounded FIFO queue between request handlers and the update worker.
//!
//! ## Design
//!
//! - Jobs live in a `VecDeque` behind a short-lived mutex
//! - A semaphore counts free slots; producers wait on it while the queue is full
//! - A `Notify` wakes the consumer after every enqueue
//! - Closing the semaphore closes the queue; queued jobs stay dequeuable

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use tokio::sync::{Notify, Semaphore};

use super::shutdown::ShutdownSignal;
use super::types::Job;

/// Number of jobs the queue holds before producers start waiting.
pub const QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("update queue is closed")]
    Closed,
    #[error("an update worker is already running")]
    WorkerAlreadyRunning,
}

/// Outcome of waiting for the next job.
#[derive(Debug)]
pub enum Dequeued {
    Job(Job),
    /// The stop signal was raised while the queue was empty.
    Cancelled,
}

#[derive(Debug)]
pub struct BoundedQueue {
    jobs: Mutex<VecDeque<Job>>,
    slots: Semaphore,
    available: Notify,
}

impl Default for BoundedQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundedQueue {
    pub fn new() -> Self {
        Self::with_capacity(QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            jobs: Mutex::new(VecDeque::with_capacity(capacity)),
            slots: Semaphore::new(capacity),
            available: Notify::new(),
        }
    }

    /// Append a job, waiting while the queue is full.
    ///
    /// Fails only once the queue has been closed.
    pub async fn enqueue(&self, job: Job) -> Result<(), QueueError> {
        let permit = self.slots.acquire().await.map_err(|_| QueueError::Closed)?;
        // The slot is handed back by whoever pops the job.
        permit.forget();
        self.lock().push_back(job);
        self.available.notify_one();
        Ok(())
    }

    /// Take the head of the queue, waiting while it is empty.
    ///
    /// Queued jobs win over the stop signal; `Cancelled` is only returned when
    /// the signal is raised and nothing is left to hand out.
    pub async fn dequeue(&self, shutdown: &mut ShutdownSignal) -> Dequeued {
        loop {
            if let Some(job) = self.try_dequeue() {
                return Dequeued::Job(job);
            }
            if shutdown.is_raised() {
                return Dequeued::Cancelled;
            }
            tokio::select! {
                _ = self.available.notified() => {}
                _ = shutdown.raised() => {}
            }
        }
    }

    /// Take the head of the queue without waiting.
    pub fn try_dequeue(&self) -> Option<Job> {
        let job = self.lock().pop_front()?;
        self.slots.add_permits(1);
        Some(job)
    }

    /// Current number of queued jobs. Only a snapshot under concurrency.
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Refuse further enqueues. Producers currently waiting for a slot get `Closed`.
    pub fn close(&self) {
        self.slots.close();
    }

    pub fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use eshop_core::ProductId;

    fn job(n: i64) -> Job {
        Job::quantity_delta(ProductId::new(n), n)
    }

    fn unwrap_job(d: Dequeued) -> Job {
        match d {
            Dequeued::Job(job) => job,
            Dequeued::Cancelled => panic!("expected a job, got cancellation"),
        }
    }

    #[tokio::test]
    async fn jobs_come_out_in_enqueue_order() {
        let queue = BoundedQueue::new();
        let (_trigger, mut signal) = ShutdownSignal::pair();

        let jobs: Vec<Job> = (1..=5).map(job).collect();
        for j in &jobs {
            queue.enqueue(j.clone()).await.unwrap();
        }
        assert_eq!(queue.size(), 5);

        for expected in &jobs {
            let got = unwrap_job(queue.dequeue(&mut signal).await);
            assert_eq!(got.job_id(), expected.job_id());
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn dequeue_wakes_on_enqueue() {
        let queue = Arc::new(BoundedQueue::new());
        let (_trigger, mut signal) = ShutdownSignal::pair();

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { unwrap_job(queue.dequeue(&mut signal).await) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let sent = job(1);
        queue.enqueue(sent.clone()).await.unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.job_id(), sent.job_id());
    }

    #[tokio::test]
    async fn full_queue_blocks_producers_until_a_slot_frees() {
        let queue = Arc::new(BoundedQueue::with_capacity(2));
        queue.enqueue(job(1)).await.unwrap();
        queue.enqueue(job(2)).await.unwrap();

        let third = job(3);
        let producer = {
            let queue = queue.clone();
            let third = third.clone();
            tokio::spawn(async move { queue.enqueue(third).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!producer.is_finished());
        assert_eq!(queue.size(), 2);

        assert!(queue.try_dequeue().is_some());
        tokio::time::timeout(Duration::from_secs(1), producer)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(queue.size(), 2);
        assert!(queue.try_dequeue().is_some());
        assert_eq!(queue.try_dequeue().unwrap().job_id(), third.job_id());
    }

    #[tokio::test]
    async fn raised_signal_cancels_an_empty_wait() {
        let queue = Arc::new(BoundedQueue::new());
        let (trigger, mut signal) = ShutdownSignal::pair();

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.dequeue(&mut signal).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.raise();

        let outcome = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(outcome, Dequeued::Cancelled));
    }

    #[tokio::test]
    async fn queued_jobs_win_over_a_raised_signal() {
        let queue = BoundedQueue::new();
        let (trigger, mut signal) = ShutdownSignal::pair();
        queue.enqueue(job(1)).await.unwrap();
        trigger.raise();

        assert!(matches!(queue.dequeue(&mut signal).await, Dequeued::Job(_)));
        assert!(matches!(queue.dequeue(&mut signal).await, Dequeued::Cancelled));
    }

    #[tokio::test]
    async fn closed_queue_rejects_enqueue_but_keeps_jobs() {
        let queue = BoundedQueue::new();
        queue.enqueue(job(1)).await.unwrap();
        queue.close();

        assert!(queue.is_closed());
        assert_eq!(queue.enqueue(job(2)).await, Err(QueueError::Closed));
        assert!(queue.try_dequeue().is_some());
        assert!(queue.try_dequeue().is_none());
    }

    #[tokio::test]
    async fn closing_releases_waiting_producers() {
        let queue = Arc::new(BoundedQueue::with_capacity(1));
        queue.enqueue(job(1)).await.unwrap();

        let producer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.enqueue(job(2)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        let result = tokio::time::timeout(Duration::from_secs(1), producer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Err(QueueError::Closed));
        assert_eq!(queue.size(), 1);
    }
}
