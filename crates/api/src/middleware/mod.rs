//! Request extractors enforcing access control.
//!
//! - [`auth::BasicAuth`] -- Checks HTTP basic credentials when configured.

pub mod auth;
