//! Label and annotation keys attached to copy jobs.
//!
//! Labels hold fingerprints and are what the dispatcher selects on.
//! Annotations hold the readable canonical references and are never matched
//! against, since label values cannot contain `/` or `:`.

use std::collections::BTreeMap;

use crate::hashing::DispatchKey;
use crate::image_ref::CopyRequest;

/// Key for the source image (fingerprint label, canonical-ref annotation).
pub const SOURCE_IMAGE_KEY: &str = "com.yankeguo.skopeo-machine/copy.source-image";

/// Key for the target image (fingerprint label, canonical-ref annotation).
pub const TARGET_IMAGE_KEY: &str = "com.yankeguo.skopeo-machine/copy.target-image";

/// Ordered string map used for both labels and annotations.
pub type StringMap = BTreeMap<String, String>;

/// Labels identifying every job of a dispatch key.
pub fn job_labels(key: &DispatchKey) -> StringMap {
    BTreeMap::from([
        (SOURCE_IMAGE_KEY.to_string(), key.source.to_string()),
        (TARGET_IMAGE_KEY.to_string(), key.target.to_string()),
    ])
}

/// Annotations carrying the canonical references of a request.
pub fn job_annotations(request: &CopyRequest) -> StringMap {
    BTreeMap::from([
        (SOURCE_IMAGE_KEY.to_string(), request.source.clone()),
        (TARGET_IMAGE_KEY.to_string(), request.target.clone()),
    ])
}

/// Serialize labels as an exact-match selector: `k1=v1,k2=v2`.
///
/// Keys come out in sorted order, so the same labels always produce the
/// same selector string. An empty map yields an empty selector.
pub fn format_selector(labels: &StringMap) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}
