//! Server models: configuration, shared state, and response envelopes.

pub mod app_state;
pub mod config;
pub mod constants;
pub mod response;

pub use app_state::AppState;
pub use config::{Configuration, MailConfig};
