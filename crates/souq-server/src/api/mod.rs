//! HTTP route modules.

pub mod analytics;
pub mod auth;
pub mod health;
mod market;
pub mod para;
pub mod products;
pub mod query;
