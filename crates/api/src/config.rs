use std::path::{Path, PathBuf};

use serde::Deserialize;
use skopeo_machine_core::settings::DispatchSettings;

/// Where the service account namespace is mounted inside a pod.
pub const SERVICE_ACCOUNT_NAMESPACE_FILE: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Which orchestration backend the dispatcher talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The Kubernetes API (`KUBECONFIG` or in-cluster credentials).
    Kube,
    /// Process-local job store; nothing is actually run.
    Memory,
}

impl BackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "kube" | "kubernetes" => Some(Self::Kube),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running in a pod.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Job backend (default: `kube`).
    pub backend: BackendKind,
    /// Path of the JSON dispatch config (default: `config.json`).
    pub config_path: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default       |
    /// |------------------------|---------------|
    /// | `HOST`                 | `0.0.0.0`     |
    /// | `PORT`                 | `8080`        |
    /// | `REQUEST_TIMEOUT_SECS` | `30`          |
    /// | `JOB_BACKEND`          | `kube`        |
    /// | `CONFIG_PATH`          | `config.json` |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let backend = std::env::var("JOB_BACKEND")
            .map(|v| BackendKind::parse(&v).expect("JOB_BACKEND must be `kube` or `memory`"))
            .unwrap_or(BackendKind::Kube);

        let config_path = std::env::var("CONFIG_PATH")
            .unwrap_or_else(|_| "config.json".into())
            .into();

        Self {
            host,
            port,
            request_timeout_secs,
            backend,
            config_path,
        }
    }
}

/// HTTP basic auth credentials. Both empty disables the check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl AuthConfig {
    pub fn is_enabled(&self) -> bool {
        !self.username.is_empty() || !self.password.is_empty()
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Contents of the JSON config file.
///
/// ```json
/// {
///   "auth": { "username": "ops", "password": "..." },
///   "job":  { "namespace": "mirror", "image": "quay.io/skopeo/stable:latest" },
///   "copy": { "ttlSeconds": 86400, "multiArch": "system", "authfileDst": "dst-cred" }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth: AuthConfig,
    #[serde(flatten)]
    pub dispatch: DispatchSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("namespace is empty")]
    EmptyNamespace,
}

impl AppConfig {
    /// Read the config file and resolve the job namespace.
    ///
    /// Namespace resolution: config file, then `POD_NAMESPACE`, then the
    /// service account namespace file. Fails if all three are empty.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.dispatch.job.namespace = resolve_namespace(
            &config.dispatch.job.namespace,
            std::env::var("POD_NAMESPACE").ok(),
            Path::new(SERVICE_ACCOUNT_NAMESPACE_FILE),
        )?;
        Ok(config)
    }

    /// Parse the config file and fill in defaults, without namespace resolution.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let buf = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_slice(&buf).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dispatch: config.dispatch.with_defaults(),
            ..config
        })
    }
}

/// Pick the first non-empty namespace from the fallback chain.
pub fn resolve_namespace(
    configured: &str,
    pod_namespace: Option<String>,
    service_account_file: &Path,
) -> Result<String, ConfigError> {
    let configured = configured.trim();
    if !configured.is_empty() {
        return Ok(configured.to_string());
    }

    if let Some(ns) = pod_namespace.map(|ns| ns.trim().to_string()) {
        if !ns.is_empty() {
            return Ok(ns);
        }
    }

    // A missing file is just the next fallback failing.
    let from_file = std::fs::read_to_string(service_account_file).unwrap_or_default();
    let from_file = from_file.trim();
    if !from_file.is_empty() {
        return Ok(from_file.to_string());
    }

    Err(ConfigError::EmptyNamespace)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;

    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn backend_kind_parsing() {
        assert_eq!(BackendKind::parse("kube"), Some(BackendKind::Kube));
        assert_eq!(BackendKind::parse(" Memory "), Some(BackendKind::Memory));
        assert_eq!(BackendKind::parse("docker"), None);
    }

    #[test]
    fn auth_disabled_when_both_empty() {
        assert!(!AuthConfig::default().is_enabled());
        let auth = AuthConfig {
            username: "ops".into(),
            password: String::new(),
        };
        assert!(auth.is_enabled());
    }

    #[test]
    fn full_config_file_is_parsed() {
        let file = write_temp(
            r#"{
                "auth": {"username": "ops", "password": "hunter2"},
                "job": {"namespace": "mirror"},
                "copy": {"authfileSrc": "src-cred"}
            }"#,
        );
        let config = AppConfig::from_file(file.path()).unwrap();

        assert!(config.auth.matches("ops", "hunter2"));
        assert_eq!(config.dispatch.job.namespace, "mirror");
        assert_eq!(config.dispatch.copy.authfile_src, "src-cred");
        assert_eq!(config.dispatch.copy.multi_arch, "system");
    }

    #[test]
    fn empty_object_gives_defaults() {
        let file = write_temp("{}");
        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(!config.auth.is_enabled());
        assert_eq!(config.dispatch, DispatchSettings::default());
    }

    #[test]
    fn explicit_empty_image_and_zero_ttl_use_defaults() {
        let file = write_temp(
            r#"{
                "job": {"image": ""},
                "copy": {"ttlSeconds": 0, "staleAfterSeconds": 0}
            }"#,
        );
        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.dispatch, DispatchSettings::default());
    }

    #[test]
    fn out_of_range_ttl_is_parse_error() {
        let file = write_temp(r#"{"copy": {"ttlSeconds": 3000000000}}"#);
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert_matches!(err, ConfigError::Parse { .. });
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert_matches!(err, ConfigError::Read { .. });
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let file = write_temp("{ not json");
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert_matches!(err, ConfigError::Parse { .. });
    }

    #[test]
    fn configured_namespace_wins() {
        let ns = resolve_namespace("mirror", Some("pod-ns".into()), Path::new("/nonexistent"));
        assert_eq!(ns.unwrap(), "mirror");
    }

    #[test]
    fn pod_namespace_is_second() {
        let ns = resolve_namespace("", Some("pod-ns".into()), Path::new("/nonexistent"));
        assert_eq!(ns.unwrap(), "pod-ns");
    }

    #[test]
    fn service_account_file_is_last_and_trimmed() {
        let file = write_temp("sa-ns\n");
        let ns = resolve_namespace("", Some(String::new()), file.path());
        assert_eq!(ns.unwrap(), "sa-ns");
    }

    #[test]
    fn all_empty_is_error() {
        let file = write_temp("  \n");
        let err = resolve_namespace("", None, file.path()).unwrap_err();
        assert_matches!(err, ConfigError::EmptyNamespace);
    }
}
