//! Capability interface over the orchestration backend.
//!
//! The dispatcher needs exactly three namespaced job operations. Keeping the
//! seam this narrow lets the engine run against the Kubernetes API or an
//! in-memory fake interchangeably.

use async_trait::async_trait;

use crate::job::{JobRecord, JobSpec};

/// Errors from backend calls. Always fatal to the current dispatch attempt.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to list jobs in {namespace}: {message}")]
    List { namespace: String, message: String },

    #[error("failed to delete job {namespace}/{name}: {message}")]
    Delete {
        namespace: String,
        name: String,
        message: String,
    },

    #[error("failed to create job {namespace}/{name}: {message}")]
    Create {
        namespace: String,
        name: String,
        message: String,
    },
}

#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Jobs in `namespace` matching an exact-match label selector
    /// (`k1=v1,k2=v2`). Empty when none exist.
    async fn list_jobs(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<JobRecord>, BackendError>;

    /// Delete a job with background propagation. Returns once the delete is
    /// accepted; dependent pods are cleaned up asynchronously.
    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), BackendError>;

    /// Create a job. Atomic: on error nothing was created.
    async fn create_job(&self, spec: &JobSpec) -> Result<JobRecord, BackendError>;
}
