//! In-process [`JobBackend`].
//!
//! Jobs live in a `Vec` behind a mutex and every call is recorded, so tests
//! can assert on exactly which list/delete/create operations the dispatcher
//! issued. Also selected by `JOB_BACKEND=memory` for running the service
//! without a cluster; nothing is executed, created jobs just sit in `active`.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use skopeo_machine_core::backend::{BackendError, JobBackend};
use skopeo_machine_core::job::{JobRecord, JobSpec};
use skopeo_machine_core::labels::StringMap;
use skopeo_machine_core::types::Timestamp;

/// One recorded backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    List { namespace: String, selector: String },
    Delete { namespace: String, name: String },
    Create { namespace: String, name: String },
}

#[derive(Debug, Clone)]
struct StoredJob {
    namespace: String,
    labels: StringMap,
    record: JobRecord,
    spec: Option<JobSpec>,
}

#[derive(Debug, Default)]
struct State {
    jobs: Vec<StoredJob>,
    calls: Vec<BackendCall>,
    fail_deletes: Option<String>,
    fail_creates: Option<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryJobBackend {
    state: Mutex<State>,
    /// Artificial latency applied to every call.
    latency: Option<Duration>,
}

impl InMemoryJobBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `latency` inside every call, widening race windows in tests.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            state: Mutex::default(),
            latency: Some(latency),
        }
    }

    /// Seed an existing job.
    pub fn insert(&self, namespace: &str, labels: StringMap, record: JobRecord) {
        self.lock().jobs.push(StoredJob {
            namespace: namespace.to_string(),
            labels,
            record,
            spec: None,
        });
    }

    /// Mark a job finished: no active pods, completed at `at`.
    /// Returns `false` if no such job exists.
    pub fn complete(&self, name: &str, at: Timestamp) -> bool {
        let mut state = self.lock();
        match state.jobs.iter_mut().find(|j| j.record.name == name) {
            Some(job) => {
                job.record.active = 0;
                job.record.completion_time = Some(at);
                true
            }
            None => false,
        }
    }

    /// Make every subsequent delete fail with `message`.
    pub fn fail_deletes(&self, message: &str) {
        self.lock().fail_deletes = Some(message.to_string());
    }

    /// Make every subsequent create fail with `message`.
    pub fn fail_creates(&self, message: &str) {
        self.lock().fail_creates = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn create_count(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::Create { .. }))
    }

    pub fn delete_count(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::Delete { .. }))
    }

    /// Records of all jobs currently stored, in insertion order.
    pub fn jobs(&self) -> Vec<JobRecord> {
        self.lock().jobs.iter().map(|j| j.record.clone()).collect()
    }

    /// Specs of jobs created through [`JobBackend::create_job`].
    pub fn created_specs(&self) -> Vec<JobSpec> {
        self.lock()
            .jobs
            .iter()
            .filter_map(|j| j.spec.clone())
            .collect()
    }

    fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Parse `k1=v1,k2=v2` into pairs. Terms without `=` are ignored.
fn parse_selector(selector: &str) -> Vec<(&str, &str)> {
    selector
        .split(',')
        .filter_map(|term| term.split_once('='))
        .collect()
}

fn matches_selector(labels: &StringMap, terms: &[(&str, &str)]) -> bool {
    terms
        .iter()
        .all(|(k, v)| labels.get(*k).map(String::as_str) == Some(*v))
}

#[async_trait]
impl JobBackend for InMemoryJobBackend {
    async fn list_jobs(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<JobRecord>, BackendError> {
        self.simulate_latency().await;

        let mut state = self.lock();
        state.calls.push(BackendCall::List {
            namespace: namespace.to_string(),
            selector: selector.to_string(),
        });

        let terms = parse_selector(selector);
        Ok(state
            .jobs
            .iter()
            .filter(|j| j.namespace == namespace && matches_selector(&j.labels, &terms))
            .map(|j| j.record.clone())
            .collect())
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), BackendError> {
        self.simulate_latency().await;

        let mut state = self.lock();
        state.calls.push(BackendCall::Delete {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });

        if let Some(message) = state.fail_deletes.clone() {
            return Err(BackendError::Delete {
                namespace: namespace.to_string(),
                name: name.to_string(),
                message,
            });
        }

        let before = state.jobs.len();
        state
            .jobs
            .retain(|j| !(j.namespace == namespace && j.record.name == name));
        if state.jobs.len() == before {
            return Err(BackendError::Delete {
                namespace: namespace.to_string(),
                name: name.to_string(),
                message: "not found".to_string(),
            });
        }

        tracing::debug!(namespace, name, "In-memory job deleted");
        Ok(())
    }

    async fn create_job(&self, spec: &JobSpec) -> Result<JobRecord, BackendError> {
        self.simulate_latency().await;

        let mut state = self.lock();
        state.calls.push(BackendCall::Create {
            namespace: spec.namespace.clone(),
            name: spec.name.clone(),
        });

        let create_error = |message: String| BackendError::Create {
            namespace: spec.namespace.clone(),
            name: spec.name.clone(),
            message,
        };

        if let Some(message) = state.fail_creates.clone() {
            return Err(create_error(message));
        }
        if state
            .jobs
            .iter()
            .any(|j| j.namespace == spec.namespace && j.record.name == spec.name)
        {
            return Err(create_error("already exists".to_string()));
        }

        let record = JobRecord {
            name: spec.name.clone(),
            active: 1,
            completion_time: None,
            creation_time: Some(chrono::Utc::now()),
        };
        state.jobs.push(StoredJob {
            namespace: spec.namespace.clone(),
            labels: spec.labels.clone(),
            record: record.clone(),
            spec: Some(spec.clone()),
        });

        tracing::debug!(namespace = %spec.namespace, name = %spec.name, "In-memory job created");
        Ok(record)
    }
}
