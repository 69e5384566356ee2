//! Fingerprints of canonical image references.
//!
//! A fingerprint is the first 40 hex chars (20 bytes) of the SHA-256
//! digest. Kubernetes caps label values at 63 characters, so the full
//! 64-char digest would not fit.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::image_ref::CopyRequest;

/// Number of hex characters kept in a fingerprint.
const FINGERPRINT_LEN: usize = 40;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Label-safe digest of a canonical image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a canonical reference. Callers must canonicalize first.
    pub fn of(canonical: &str) -> Self {
        let mut hex = sha256_hex(canonical.as_bytes());
        hex.truncate(FINGERPRINT_LEN);
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dedup identity of a copy operation: (source fingerprint, target fingerprint).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    pub source: Fingerprint,
    pub target: Fingerprint,
}

impl DispatchKey {
    pub fn for_request(request: &CopyRequest) -> Self {
        Self {
            source: Fingerprint::of(&request.source),
            target: Fingerprint::of(&request.target),
        }
    }
}
