//! Image reference canonicalization.
//!
//! Copy requests arrive with free-form references (`alpine`, `org/app:v2`,
//! `registry.example.com/team/app`). Everything downstream (fingerprints,
//! job annotations, `skopeo` arguments) works on the canonical
//! `registry/repository:tag` form produced here, so two spellings of the
//! same image always land on the same dispatch key.

/// Registry host assumed when a reference carries none.
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// Namespace used for official images on the default registry.
pub const DEFAULT_NAMESPACE: &str = "library";

/// Tag appended when a reference has neither tag nor digest.
pub const DEFAULT_TAG: &str = "latest";

/// Normalize an image reference into `registry/repository:tag` form.
///
/// Total: malformed input is passed through (possibly prefixed) rather than
/// rejected, and `skopeo` reports the error when the job runs.
///
/// The result is idempotent: canonicalizing a canonical reference returns it
/// unchanged.
pub fn canonicalize(reference: &str) -> String {
    let mut image = reference.to_string();
    if !image.contains(':') {
        image.push(':');
        image.push_str(DEFAULT_TAG);
    }

    let segments: Vec<&str> = image.split('/').collect();

    if segments.len() < 2 {
        return format!("{DEFAULT_REGISTRY}/{DEFAULT_NAMESPACE}/{image}");
    }

    if looks_like_registry(segments[0]) {
        if segments.len() == 2 && segments[0] == DEFAULT_REGISTRY {
            return format!("{DEFAULT_REGISTRY}/{DEFAULT_NAMESPACE}/{}", segments[1]);
        }
        return image;
    }

    format!("{DEFAULT_REGISTRY}/{image}")
}

/// A first path segment with a dot or a port separator is a registry host.
fn looks_like_registry(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':')
}

/// An ordered (source, target) pair, both already canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub source: String,
    pub target: String,
}

impl CopyRequest {
    /// Canonicalize both references of a raw request.
    pub fn canonical(source: &str, target: &str) -> Self {
        Self {
            source: canonicalize(source),
            target: canonicalize(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "alpine",
        "alpine:3.20",
        "alpine@sha256:0123abcd",
        "docker.io/alpine",
        "docker.io/alpine:edge",
        "docker.io/library/alpine:latest",
        "org/app",
        "org/app:v1",
        "org/team/app",
        "myregistry.example.com/team/app:v2",
        "myregistry.example.com/app",
        "localhost:5000/app",
        "localhost/app",
        "ghcr.io/owner/repo/sub:tag",
        "",
    ];

    #[test]
    fn bare_name_gets_library_namespace_and_latest() {
        assert_eq!(canonicalize("alpine"), "docker.io/library/alpine:latest");
    }

    #[test]
    fn docker_hub_two_segments_gets_library_namespace() {
        assert_eq!(
            canonicalize("docker.io/alpine"),
            "docker.io/library/alpine:latest"
        );
        assert_eq!(
            canonicalize("docker.io/alpine:3.20"),
            "docker.io/library/alpine:3.20"
        );
    }

    #[test]
    fn qualified_reference_is_unchanged() {
        assert_eq!(
            canonicalize("myregistry.example.com/team/app:v2"),
            "myregistry.example.com/team/app:v2"
        );
    }

    #[test]
    fn namespaced_reference_gets_default_registry() {
        assert_eq!(canonicalize("org/app"), "docker.io/org/app:latest");
        assert_eq!(canonicalize("org/team/app"), "docker.io/org/team/app:latest");
    }

    #[test]
    fn tagged_single_segment_stays_single_segment() {
        assert_eq!(
            canonicalize("alpine:3.20"),
            "docker.io/library/alpine:3.20"
        );
        assert_eq!(
            canonicalize("alpine@sha256:0123abcd"),
            "docker.io/library/alpine@sha256:0123abcd"
        );
    }

    #[test]
    fn registry_with_port_is_never_prefixed() {
        // The port colon counts as a tag marker, so no `:latest` is added.
        assert_eq!(canonicalize("localhost:5000/app"), "localhost:5000/app");
    }

    #[test]
    fn localhost_without_port_is_a_hub_namespace() {
        assert_eq!(canonicalize("localhost/app"), "docker.io/localhost/app:latest");
    }

    #[test]
    fn non_hub_two_segment_registry_is_not_rewritten() {
        assert_eq!(
            canonicalize("myregistry.example.com/app"),
            "myregistry.example.com/app:latest"
        );
    }

    #[test]
    fn canonicalization_is_idempotent() {
        for sample in SAMPLES {
            let once = canonicalize(sample);
            let twice = canonicalize(&once);
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn copy_request_canonicalizes_both_sides() {
        let req = CopyRequest::canonical("alpine", "registry.internal/mirror/alpine");
        assert_eq!(req.source, "docker.io/library/alpine:latest");
        assert_eq!(req.target, "registry.internal/mirror/alpine:latest");
    }
}
