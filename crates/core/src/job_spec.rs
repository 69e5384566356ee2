//! Builds the manifest of a `skopeo copy` job.
//!
//! [`build`] is pure: the job name is generated by the caller (see
//! [`new_job_name`]) so the output is fully determined by the arguments.

use crate::hashing::DispatchKey;
use crate::image_ref::CopyRequest;
use crate::job::{ContainerSpec, JobSpec, SecretVolume, VolumeMount};
use crate::labels::{job_annotations, job_labels};
use crate::settings::DispatchSettings;

/// Prefix of every copy job name.
pub const JOB_NAME_PREFIX: &str = "skopeo-copy-";

/// Name of the single container in the pod template.
pub const CONTAINER_NAME: &str = "skopeo-copy";

/// Restart on failure only; a successful copy is never repeated by the pod.
pub const RESTART_POLICY: &str = "OnFailure";

/// Transport scheme for both `skopeo copy` operands.
pub const TRANSPORT: &str = "docker://";

pub const AUTHFILE_SRC_VOLUME: &str = "authfile-src";
pub const AUTHFILE_SRC_MOUNT: &str = "/authfile-src";
pub const AUTHFILE_DST_VOLUME: &str = "authfile-dst";
pub const AUTHFILE_DST_MOUNT: &str = "/authfile-dst";

/// File name of the credential inside a `kubernetes.io/dockerconfigjson` secret.
const DOCKERCONFIG_FILE: &str = ".dockerconfigjson";

/// Fresh, time-sortable job name. Uniqueness only; dedup goes through labels.
pub fn new_job_name() -> String {
    format!("{JOB_NAME_PREFIX}{}", uuid::Uuid::now_v7().simple())
}

/// Assemble the job manifest for a canonical copy request.
pub fn build(
    request: &CopyRequest,
    key: &DispatchKey,
    settings: &DispatchSettings,
    name: String,
) -> JobSpec {
    let copy = &settings.copy;

    let mut volumes = Vec::new();
    let mut volume_mounts = Vec::new();
    if !copy.authfile_src.is_empty() {
        volumes.push(secret_volume(AUTHFILE_SRC_VOLUME, &copy.authfile_src));
        volume_mounts.push(read_only_mount(AUTHFILE_SRC_VOLUME, AUTHFILE_SRC_MOUNT));
    }
    if !copy.authfile_dst.is_empty() {
        volumes.push(secret_volume(AUTHFILE_DST_VOLUME, &copy.authfile_dst));
        volume_mounts.push(read_only_mount(AUTHFILE_DST_VOLUME, AUTHFILE_DST_MOUNT));
    }

    JobSpec {
        name,
        namespace: settings.job.namespace.clone(),
        labels: job_labels(key),
        annotations: job_annotations(request),
        ttl_seconds_after_finished: copy.ttl_seconds,
        restart_policy: RESTART_POLICY.to_string(),
        image_pull_secrets: settings
            .job
            .image_pull_secrets
            .iter()
            .map(|s| s.name.clone())
            .collect(),
        volumes,
        container: ContainerSpec {
            name: CONTAINER_NAME.to_string(),
            image: settings.job.image.clone(),
            image_pull_policy: settings.job.image_pull_policy.clone(),
            volume_mounts,
            args: copy_args(request, settings),
        },
    }
}

/// `skopeo` argument vector. Order is fixed:
/// `copy`, `--multi-arch`, `--src-authfile`, `--dest-authfile`, source, target.
pub fn copy_args(request: &CopyRequest, settings: &DispatchSettings) -> Vec<String> {
    let copy = &settings.copy;
    let mut args = vec!["copy".to_string()];
    if !copy.multi_arch.is_empty() {
        args.push(format!("--multi-arch={}", copy.multi_arch));
    }
    if !copy.authfile_src.is_empty() {
        args.push(format!("--src-authfile={AUTHFILE_SRC_MOUNT}/{DOCKERCONFIG_FILE}"));
    }
    if !copy.authfile_dst.is_empty() {
        args.push(format!("--dest-authfile={AUTHFILE_DST_MOUNT}/{DOCKERCONFIG_FILE}"));
    }
    args.push(format!("{TRANSPORT}{}", request.source));
    args.push(format!("{TRANSPORT}{}", request.target));
    args
}

fn secret_volume(name: &str, secret_name: &str) -> SecretVolume {
    SecretVolume {
        name: name.to_string(),
        secret_name: secret_name.to_string(),
    }
}

fn read_only_mount(name: &str, mount_path: &str) -> VolumeMount {
    VolumeMount {
        name: name.to_string(),
        mount_path: mount_path.to_string(),
        read_only: true,
    }
}
