//! Souq API server library.
//!
//! Exposes the HTTP layer (routes, middleware, startup helpers) so the
//! binary in `main.rs` stays a thin composition root.

pub mod api;
pub mod middleware;
pub mod model;
pub mod service;
pub mod startup;
