//! Reclamation policy for existing copy jobs.
//!
//! Pure classification over [`JobRecord`]s; the dispatcher performs the
//! actual deletes. Rules, applied to each job independently:
//!
//! | State                                   | Outcome  |
//! |-----------------------------------------|----------|
//! | `active > 0`                            | blocking |
//! | completed, `now - completion <= stale`  | blocking |
//! | completed, `now - completion > stale`   | delete   |
//! | not active, never completed (orphaned)  | delete   |
//!
//! A recently completed job counts as blocking, so an identical request
//! inside the stale window is a no-op. Completed jobs are reclaimed once they
//! pass the stale threshold.

use chrono::Duration;

use crate::job::JobRecord;
use crate::types::Timestamp;

/// What to do with a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Running, or finished recently enough to satisfy the request.
    Blocking,
    /// Completed longer ago than the stale threshold.
    Stale,
    /// Neither running nor completed (failed out, or pods lost).
    Orphaned,
}

/// Classify one job.
pub fn classify_job(job: &JobRecord, now: Timestamp, stale_after: Duration) -> Verdict {
    if job.is_active() {
        return Verdict::Blocking;
    }
    match job.completion_time {
        Some(completed) if now - completed <= stale_after => Verdict::Blocking,
        Some(_) => Verdict::Stale,
        None => Verdict::Orphaned,
    }
}

/// Aggregate decision over every job sharing a dispatch key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reclamation {
    /// At least one job covers the request; do not create another.
    pub blocking: bool,
    /// Jobs to delete, in listing order. Deleted whether or not `blocking`.
    pub to_delete: Vec<JobRecord>,
}

/// Classify every job and collect the aggregate decision.
pub fn classify(jobs: &[JobRecord], now: Timestamp, stale_after: Duration) -> Reclamation {
    let mut reclamation = Reclamation::default();
    for job in jobs {
        match classify_job(job, now, stale_after) {
            Verdict::Blocking => reclamation.blocking = true,
            Verdict::Stale | Verdict::Orphaned => reclamation.to_delete.push(job.clone()),
        }
    }
    reclamation
}
