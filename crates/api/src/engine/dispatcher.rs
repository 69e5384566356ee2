//! Idempotent copy-job dispatcher.
//!
//! Each request runs `list → reclaim → decide → build → create` while holding
//! a single engine-wide lock, so the whole decision is linearized across all
//! concurrent requests. The lock is not per dispatch key: unrelated copies
//! also queue behind each other.

use std::sync::Arc;

use serde::Serialize;
use skopeo_machine_core::backend::{BackendError, JobBackend};
use skopeo_machine_core::clock::Clock;
use skopeo_machine_core::hashing::DispatchKey;
use skopeo_machine_core::image_ref::CopyRequest;
use skopeo_machine_core::job_spec;
use skopeo_machine_core::labels::{format_selector, job_labels};
use skopeo_machine_core::reclamation;
use skopeo_machine_core::settings::DispatchSettings;
use tokio::sync::Mutex;

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// A new job was created.
    Accepted { job_name: String },
    /// A running or recently completed job already covers this copy.
    Skipped,
}

/// Copy-job dispatcher. Construct once and share behind an `Arc`.
pub struct Dispatcher {
    backend: Arc<dyn JobBackend>,
    clock: Arc<dyn Clock>,
    settings: DispatchSettings,
    /// Held for the whole of one dispatch. Locked = busy, unlocked = idle.
    gate: Mutex<()>,
}

impl Dispatcher {
    pub fn new(
        backend: Arc<dyn JobBackend>,
        clock: Arc<dyn Clock>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            backend,
            clock,
            settings,
            gate: Mutex::new(()),
        }
    }

    /// Whether a dispatch is currently in progress.
    pub fn is_busy(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    /// Dispatch a copy from `source` to `target`.
    ///
    /// Any backend error aborts the attempt immediately, including a failed
    /// delete during reclamation (no job is created in that case). Nothing is
    /// retried.
    pub async fn dispatch(
        &self,
        source: &str,
        target: &str,
    ) -> Result<DispatchOutcome, BackendError> {
        let request = CopyRequest::canonical(source, target);
        let key = DispatchKey::for_request(&request);

        let _busy = self.gate.lock().await;

        tracing::info!(
            source = %request.source,
            target = %request.target,
            "Copy requested",
        );

        let namespace = self.settings.job.namespace.as_str();
        let selector = format_selector(&job_labels(&key));
        let existing = self.backend.list_jobs(namespace, &selector).await?;

        let decision = reclamation::classify(
            &existing,
            self.clock.now(),
            self.settings.stale_after(),
        );

        for job in &decision.to_delete {
            tracing::info!(
                job_name = %job.name,
                created_at = ?job.creation_time,
                completed_at = ?job.completion_time,
                "Reclaiming copy job",
            );
            self.backend.delete_job(namespace, &job.name).await?;
        }

        if decision.blocking {
            tracing::info!(
                source = %request.source,
                target = %request.target,
                "Copy job active or still valid, skipping",
            );
            return Ok(DispatchOutcome::Skipped);
        }

        let spec = job_spec::build(&request, &key, &self.settings, job_spec::new_job_name());
        let created = self.backend.create_job(&spec).await?;

        tracing::info!(
            job_name = %created.name,
            namespace,
            source = %request.source,
            target = %request.target,
            "Copy job created",
        );

        Ok(DispatchOutcome::Accepted {
            job_name: created.name,
        })
    }
}
