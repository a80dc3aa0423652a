//! Core job types and status records.

use serde::{Deserialize, Serialize};

use eshop_core::{JobId, ProductId};
use eshop_products::ProductUpdate;

/// A queued product update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Job {
    /// Merge the present fields of `fields` into the product.
    FullUpdate {
        job_id: JobId,
        product_id: ProductId,
        fields: ProductUpdate,
    },
    /// Add `delta` to the product's quantity.
    QuantityDelta {
        job_id: JobId,
        product_id: ProductId,
        delta: i64,
    },
}

impl Job {
    pub fn full_update(product_id: ProductId, fields: ProductUpdate) -> Self {
        Self::FullUpdate {
            job_id: JobId::new(),
            product_id,
            fields,
        }
    }

    pub fn quantity_delta(product_id: ProductId, delta: i64) -> Self {
        Self::QuantityDelta {
            job_id: JobId::new(),
            product_id,
            delta,
        }
    }

    pub fn job_id(&self) -> JobId {
        match self {
            Job::FullUpdate { job_id, .. } | Job::QuantityDelta { job_id, .. } => *job_id,
        }
    }

    pub fn product_id(&self) -> ProductId {
        match self {
            Job::FullUpdate { product_id, .. } | Job::QuantityDelta { product_id, .. } => {
                *product_id
            }
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Job::FullUpdate { .. } => "full_update",
            Job::QuantityDelta { .. } => "quantity_delta",
        }
    }
}

/// Job lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    /// Accepted, waiting in the queue
    Queued,
    /// Picked up by the worker
    Processing,
    /// Applied and committed
    Completed,
    /// Rejected or not persisted
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "Queued",
            JobState::Processing => "Processing",
            JobState::Completed => "Completed",
            JobState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a poller sees for a job: its state and, for failures, the reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub state: JobState,
    pub message: String,
}

impl StatusRecord {
    pub fn queued() -> Self {
        Self {
            state: JobState::Queued,
            message: String::new(),
        }
    }

    pub fn processing() -> Self {
        Self {
            state: JobState::Processing,
            message: String::new(),
        }
    }

    pub fn completed() -> Self {
        Self {
            state: JobState::Completed,
            message: String::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            state: JobState::Failed,
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
