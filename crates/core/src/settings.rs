//! Dispatch settings consumed by the job spec builder and reclamation policy.
//!
//! These mirror the `job` and `copy` sections of the service's JSON config
//! file. Loading, the namespace fallback chain, and validation live in the
//! API crate; this module only defines shape and defaults.

use serde::Deserialize;

/// Default `skopeo` image for copy jobs.
pub const DEFAULT_JOB_IMAGE: &str = "quay.io/skopeo/stable:latest";

/// Default `--multi-arch` value passed to `skopeo copy`.
pub const DEFAULT_MULTI_ARCH: &str = "system";

/// One day, used as default for both the finished-job TTL and the stale threshold.
pub const ONE_DAY_SECS: i32 = 24 * 60 * 60;

/// Reference to an image pull secret in the job namespace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecretRef {
    pub name: String,
}

/// Settings for the Kubernetes job itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSettings {
    /// Namespace jobs are created in. Empty means "resolve at startup".
    pub namespace: String,
    pub image: String,
    /// `Always`, `IfNotPresent` or `Never`; cluster default when unset.
    pub image_pull_policy: Option<String>,
    pub image_pull_secrets: Vec<SecretRef>,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            image: DEFAULT_JOB_IMAGE.to_string(),
            image_pull_policy: None,
            image_pull_secrets: Vec::new(),
        }
    }
}

/// Settings for the copy operation and job lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CopySettings {
    /// `ttlSecondsAfterFinished` on created jobs.
    pub ttl_seconds: i32,
    /// Completed jobs older than this no longer block a new copy and are deleted.
    pub stale_after_seconds: i32,
    /// `--multi-arch` policy; omitted from the arguments when empty.
    pub multi_arch: String,
    /// Secret holding the source registry `.dockerconfigjson`.
    pub authfile_src: String,
    /// Secret holding the destination registry `.dockerconfigjson`.
    pub authfile_dst: String,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            ttl_seconds: ONE_DAY_SECS,
            stale_after_seconds: ONE_DAY_SECS,
            multi_arch: DEFAULT_MULTI_ARCH.to_string(),
            authfile_src: String::new(),
            authfile_dst: String::new(),
        }
    }
}

/// Everything the dispatch engine needs from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub job: JobSettings,
    pub copy: CopySettings,
}

impl DispatchSettings {
    /// Replace empty or non-positive values with their defaults.
    ///
    /// Serde only fills keys that are absent; a config that spells out
    /// `"image": ""` or `"ttlSeconds": 0` still gets the defaults here.
    /// `multiArch` is left alone since empty omits the flag.
    pub fn with_defaults(mut self) -> Self {
        if self.job.image.trim().is_empty() {
            self.job.image = DEFAULT_JOB_IMAGE.to_string();
        }
        if self.copy.ttl_seconds <= 0 {
            self.copy.ttl_seconds = ONE_DAY_SECS;
        }
        if self.copy.stale_after_seconds <= 0 {
            self.copy.stale_after_seconds = ONE_DAY_SECS;
        }
        self
    }

    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.copy.stale_after_seconds))
    }
}
