//! Request handlers.
//!
//! Handlers validate input, delegate to the [`crate::engine`] and map errors
//! via [`crate::error::AppError`].

pub mod copy;
