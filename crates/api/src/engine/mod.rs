//! Copy-job dispatch engine.
//!
//! Holds the [`dispatcher::Dispatcher`] that turns a copy request into at
//! most one running Kubernetes job per (source, target) pair.

pub mod dispatcher;
