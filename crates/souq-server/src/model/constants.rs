//! Server-wide constants and configuration defaults.

pub const PROJECT_NAME: &str = "Souq API";

// ============================================================================
// HTTP server
// ============================================================================

pub const API_CONTEXT_PATH: &str = "/api/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8000;

// ============================================================================
// Database
// ============================================================================

pub const DEFAULT_DB_NAME: &str = "Retails";
pub const DEFAULT_AUTH_DB_NAME: &str = "Users";

// ============================================================================
// Authentication
// ============================================================================

pub const DEFAULT_SECRET_KEY: &str = "YOUR_SUPER_SECRET_KEY_CHANGE_ME";
pub const DEFAULT_TOKEN_EXPIRE_MINUTES: i64 = 30;
pub const RESET_CODE_EXPIRE_MINUTES: i64 = 15;

// ============================================================================
// Email
// ============================================================================

pub const DEFAULT_MAIL_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_MAIL_PORT: u16 = 587;
