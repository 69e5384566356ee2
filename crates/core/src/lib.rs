//! Domain logic for skopeo-machine: image reference canonicalization,
//! fingerprints, the reclamation policy and the job spec builder.
//!
//! No I/O here. The orchestration backend is reached through the
//! [`backend::JobBackend`] trait, implemented in `skopeo-machine-cluster`.

pub mod backend;
pub mod clock;
pub mod error;
pub mod hashing;
pub mod image_ref;
pub mod job;
pub mod job_spec;
pub mod labels;
pub mod reclamation;
pub mod settings;
pub mod types;
