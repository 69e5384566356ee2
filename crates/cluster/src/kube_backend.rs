//! [`JobBackend`] over the Kubernetes `batch/v1` Job API.

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::Client;
use serde_json::json;
use skopeo_machine_core::backend::{BackendError, JobBackend};
use skopeo_machine_core::job::{JobRecord, JobSpec};

/// Kubernetes-backed job store.
#[derive(Clone)]
pub struct KubeJobBackend {
    client: Client,
}

impl KubeJobBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using `KUBECONFIG` when set, otherwise the in-cluster
    /// service account (falling back to `~/.kube/config`).
    pub async fn connect() -> Result<Self, kube::Error> {
        if std::env::var_os("KUBECONFIG").is_some() {
            tracing::info!("KUBECONFIG is set, using kubeconfig");
        } else {
            tracing::info!("KUBECONFIG is not set, using in-cluster config");
        }
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    fn jobs(&self, namespace: &str) -> Api<Job> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl JobBackend for KubeJobBackend {
    async fn list_jobs(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<JobRecord>, BackendError> {
        let list = self
            .jobs(namespace)
            .list(&ListParams::default().labels(selector))
            .await
            .map_err(|e| BackendError::List {
                namespace: namespace.to_string(),
                message: e.to_string(),
            })?;

        Ok(list.items.iter().map(job_record).collect())
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), BackendError> {
        self.jobs(namespace)
            .delete(name, &delete_params())
            .await
            .map_err(|e| BackendError::Delete {
                namespace: namespace.to_string(),
                name: name.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn create_job(&self, spec: &JobSpec) -> Result<JobRecord, BackendError> {
        let create_error = |message: String| BackendError::Create {
            namespace: spec.namespace.clone(),
            name: spec.name.clone(),
            message,
        };

        let job = to_kube_job(spec).map_err(|e| create_error(e.to_string()))?;
        let created = self
            .jobs(&spec.namespace)
            .create(&PostParams::default(), &job)
            .await
            .map_err(|e| create_error(e.to_string()))?;

        Ok(job_record(&created))
    }
}

/// Deletes cascade to the job's pods in the background.
fn delete_params() -> DeleteParams {
    DeleteParams::background()
}

/// Project a Kubernetes job onto the fields the reclamation policy reads.
pub fn job_record(job: &Job) -> JobRecord {
    let status = job.status.as_ref();
    JobRecord {
        name: job.metadata.name.clone().unwrap_or_default(),
        active: status.and_then(|s| s.active).unwrap_or(0),
        completion_time: status
            .and_then(|s| s.completion_time.as_ref())
            .map(|t| t.0),
        creation_time: job.metadata.creation_timestamp.as_ref().map(|t| t.0),
    }
}

/// Render a [`JobSpec`] as a `batch/v1` Job manifest.
pub fn to_kube_job(spec: &JobSpec) -> Result<Job, serde_json::Error> {
    let volumes: Vec<_> = spec
        .volumes
        .iter()
        .map(|v| json!({ "name": v.name, "secret": { "secretName": v.secret_name } }))
        .collect();
    let volume_mounts: Vec<_> = spec
        .container
        .volume_mounts
        .iter()
        .map(|m| json!({ "name": m.name, "mountPath": m.mount_path, "readOnly": m.read_only }))
        .collect();
    let pull_secrets: Vec<_> = spec
        .image_pull_secrets
        .iter()
        .map(|name| json!({ "name": name }))
        .collect();

    serde_json::from_value(json!({
        "apiVersion": "batch/v1",
        "kind": "Job",
        "metadata": {
            "name": spec.name,
            "namespace": spec.namespace,
            "labels": spec.labels,
            "annotations": spec.annotations,
        },
        "spec": {
            "ttlSecondsAfterFinished": spec.ttl_seconds_after_finished,
            "template": {
                "metadata": {
                    "labels": spec.labels,
                    "annotations": spec.annotations,
                },
                "spec": {
                    "restartPolicy": spec.restart_policy,
                    "imagePullSecrets": pull_secrets,
                    "volumes": volumes,
                    "containers": [{
                        "name": spec.container.name,
                        "image": spec.container.image,
                        "imagePullPolicy": spec.container.image_pull_policy,
                        "volumeMounts": volume_mounts,
                        "args": spec.container.args,
                    }],
                },
            },
        },
    }))
}
