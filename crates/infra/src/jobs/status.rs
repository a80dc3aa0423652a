//! Status table for queued jobs.
//!
//! An entry appears when a job is accepted, is overwritten by the worker as the
//! job progresses, and disappears the first time a poll observes a terminal
//! state. Each operation is a single critical section.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use eshop_core::JobId;

use super::types::StatusRecord;

#[derive(Debug, Default)]
pub struct StatusTable {
    entries: Mutex<HashMap<JobId, StatusRecord>>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_queued(&self, job_id: JobId) {
        self.lock().insert(job_id, StatusRecord::queued());
    }

    pub fn set(&self, job_id: JobId, record: StatusRecord) {
        self.lock().insert(job_id, record);
    }

    /// Read a job's status. A terminal status is handed out exactly once.
    pub fn poll(&self, job_id: JobId) -> Option<StatusRecord> {
        let mut entries = self.lock();
        let record = entries.get(&job_id)?.clone();
        if record.is_terminal() {
            entries.remove(&job_id);
        }
        Some(record)
    }

    pub fn remove(&self, job_id: JobId) -> Option<StatusRecord> {
        self.lock().remove(&job_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, StatusRecord>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
