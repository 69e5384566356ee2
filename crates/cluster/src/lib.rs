//! Orchestration backends for the dispatch engine.
//!
//! - [`KubeJobBackend`] talks to the Kubernetes API (`batch/v1` Jobs).
//! - [`InMemoryJobBackend`] keeps jobs in process memory; used by tests and
//!   for local runs without a cluster.

pub mod kube_backend;
pub mod memory;

pub use kube_backend::KubeJobBackend;
pub use memory::{BackendCall, InMemoryJobBackend};
