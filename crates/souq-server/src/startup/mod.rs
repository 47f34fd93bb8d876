//! Application startup utilities: logging, the HTTP server, and
//! graceful shutdown.

mod http;
mod logging;
mod shutdown;

pub use http::api_server;
pub use logging::{LoggingConfig, LoggingGuard, init_logging};
pub use shutdown::{GracefulShutdown, ShutdownSignal, wait_for_shutdown_signal};
