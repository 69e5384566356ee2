//! Backend-neutral job model.
//!
//! [`JobRecord`] is the read-only view of an existing job that the
//! reclamation policy classifies. [`JobSpec`] is the manifest handed to the
//! backend on creation; the Kubernetes backend turns it into a `batch/v1`
//! `Job`.

use crate::labels::StringMap;
use crate::types::Timestamp;

/// Observed state of a job that already exists in the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub name: String,
    /// Number of pods currently running for the job.
    pub active: i32,
    /// Set once the job finished successfully.
    pub completion_time: Option<Timestamp>,
    pub creation_time: Option<Timestamp>,
}

impl JobRecord {
    pub fn is_active(&self) -> bool {
        self.active > 0
    }
}

/// Pod volume backed by a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretVolume {
    pub name: String,
    pub secret_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub name: String,
    pub mount_path: String,
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub image_pull_policy: Option<String>,
    pub volume_mounts: Vec<VolumeMount>,
    pub args: Vec<String>,
}

/// Complete manifest for one copy job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub name: String,
    pub namespace: String,
    /// Applied to both the job and its pod template.
    pub labels: StringMap,
    /// Applied to both the job and its pod template.
    pub annotations: StringMap,
    pub ttl_seconds_after_finished: i32,
    /// Pod restart policy, e.g. `OnFailure`.
    pub restart_policy: String,
    pub image_pull_secrets: Vec<String>,
    pub volumes: Vec<SecretVolume>,
    pub container: ContainerSpec,
}
