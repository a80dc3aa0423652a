//! Asynchronous product update queue.
//!
//! ## Design
//!
//! - Producers submit jobs into a bounded FIFO queue (capacity 100) and wait while it is full
//! - One worker applies jobs strictly in order, so no per-product locking is needed
//! - Every job has a status entry from the moment it is accepted
//! - A terminal status is delivered to exactly one poll, then forgotten
//! - On shutdown the worker finishes every job already accepted
//!
//! ## Components
//!
//! - `ProductUpdateQueue`: submission facade and status polling
//! - `BoundedQueue`: the FIFO buffer with backpressure
//! - `StatusTable`: per-job status with delete-on-terminal-read
//! - `UpdateWorker`: the background consumer
//! - `execute`: applies a single job to the product store

pub mod executor;
pub mod queue;
pub mod service;
pub mod shutdown;
pub mod status;
pub mod types;
pub mod worker;

pub use executor::execute;
pub use queue::{BoundedQueue, Dequeued, QUEUE_CAPACITY, QueueError};
pub use service::ProductUpdateQueue;
pub use shutdown::{ShutdownSignal, ShutdownTrigger};
pub use status::StatusTable;
pub use types::{Job, JobState, StatusRecord};
pub use worker::{UpdateWorker, UpdateWorkerHandle, WorkerStats};
