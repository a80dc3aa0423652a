//! Applies a single job to the product store.

use tracing::{debug, error};

use eshop_core::DomainError;
use eshop_products::messages;

use crate::repository::{ProductStore, RepositoryError};

use super::types::{Job, StatusRecord};

#[derive(Debug)]
enum JobFailure {
    /// The job cannot be applied; the message goes to the poller verbatim.
    Rejected(String),
    /// The store misbehaved; the poller gets a generic message.
    Internal(RepositoryError),
}

impl From<RepositoryError> for JobFailure {
    fn from(value: RepositoryError) -> Self {
        Self::Internal(value)
    }
}

impl From<DomainError> for JobFailure {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(message) | DomainError::InvalidId(message) => {
                Self::Rejected(message)
            }
        }
    }
}

/// Run `job` against `store` and return its terminal status.
///
/// The product is re-read and re-validated inside one session; writes are
/// committed before this returns `Completed`. Errors never escape: they are
/// logged and folded into a `Failed` record.
pub async fn execute(store: &dyn ProductStore, job: &Job) -> StatusRecord {
    match run(store, job).await {
        Ok(()) => {
            debug!(job_id = %job.job_id(), product_id = %job.product_id(), kind = job.kind(), "job applied");
            StatusRecord::completed()
        }
        Err(JobFailure::Rejected(message)) => {
            debug!(job_id = %job.job_id(), product_id = %job.product_id(), reason = %message, "job rejected");
            StatusRecord::failed(message)
        }
        Err(JobFailure::Internal(e)) => {
            error!(job_id = %job.job_id(), product_id = %job.product_id(), error = %e, "failed to persist job");
            StatusRecord::failed(messages::INTERNAL_ERROR)
        }
    }
}

async fn run(store: &dyn ProductStore, job: &Job) -> Result<(), JobFailure> {
    let session = store.session().await?;

    let Some(mut product) = session.find_by_id(job.product_id()).await? else {
        return Err(JobFailure::Rejected(messages::NOT_FOUND.to_string()));
    };

    let applied = match job {
        Job::FullUpdate { fields, .. } => {
            product.try_merge(fields)?;
            session.apply_full_update(product).await?
        }
        Job::QuantityDelta { delta, .. } => {
            // Checked against the current stock; the store applies the delta itself.
            product.apply_quantity_delta(*delta)?;
            session.apply_quantity_delta(product.id, *delta).await?
        }
    };

    if applied.is_none() {
        return Err(JobFailure::Rejected(messages::NOT_FOUND.to_string()));
    }

    session.commit().await?;
    Ok(())
}
