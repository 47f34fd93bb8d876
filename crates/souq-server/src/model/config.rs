//! Configuration loading for the Souq server.
//!
//! Settings come from an optional `conf/application.yml`, environment
//! variables (e.g. `MONGO_URI`, `SECRET_KEY`, `MAIL_USERNAME`), and a few
//! command line overrides, in increasing priority.

use anyhow::Context;
use clap::Parser;
use config::{Config, Environment};

use super::constants::{
    DEFAULT_AUTH_DB_NAME, DEFAULT_DB_NAME, DEFAULT_MAIL_PORT, DEFAULT_MAIL_SERVER,
    DEFAULT_SECRET_KEY, DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT, DEFAULT_TOKEN_EXPIRE_MINUTES,
};

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command(name = "souq-server", about = "Souq price comparison API server")]
struct Cli {
    #[arg(short = 'a', long = "address")]
    address: Option<String>,
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
    #[arg(long = "mongo-uri", env = "MONGO_URI", hide_env_values = true)]
    mongo_uri: Option<String>,
}

/// SMTP settings consumed by the mail service.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub username: String,
    pub password: String,
    pub from: String,
    pub from_name: String,
    pub server: String,
    pub port: u16,
    pub starttls: bool,
    pub ssl_tls: bool,
    pub use_credentials: bool,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Self {
        let args = Cli::parse();
        let mut config_builder = Config::builder()
            .add_source(config::File::with_name("conf/application").required(false))
            .add_source(Environment::default().try_parsing(true));

        if let Some(v) = args.address {
            config_builder = config_builder
                .set_override("server_address", v)
                .expect("Failed to set server address override");
        }
        if let Some(v) = args.port {
            config_builder = config_builder
                .set_override("server_port", i64::from(v))
                .expect("Failed to set server port override");
        }
        if let Some(v) = args.mongo_uri {
            config_builder = config_builder
                .set_override("mongo_uri", v)
                .expect("Failed to set MongoDB URI override");
        }

        let config = config_builder
            .build()
            .expect("Failed to build configuration - check conf/application.yml");

        Configuration { config }
    }

    /// Build from an already-constructed `Config`, for tests.
    pub fn from_config(config: Config) -> Self {
        Configuration { config }
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string("server_address")
            .unwrap_or(DEFAULT_SERVER_ADDRESS.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int("server_port")
            .unwrap_or(DEFAULT_SERVER_PORT.into()) as u16
    }

    // ========================================================================
    // Database Configuration
    // ========================================================================

    pub fn mongo_uri(&self) -> anyhow::Result<String> {
        self.config
            .get_string("mongo_uri")
            .context("MONGO_URI is not set")
    }

    pub fn db_name(&self) -> String {
        self.config
            .get_string("db_name")
            .unwrap_or(DEFAULT_DB_NAME.to_string())
    }

    pub fn auth_db_name(&self) -> String {
        self.config
            .get_string("auth_db_name")
            .unwrap_or(DEFAULT_AUTH_DB_NAME.to_string())
    }

    // ========================================================================
    // Authentication Configuration
    // ========================================================================

    pub fn secret_key(&self) -> String {
        self.config
            .get_string("secret_key")
            .unwrap_or(DEFAULT_SECRET_KEY.to_string())
    }

    pub fn is_default_secret_key(&self) -> bool {
        self.secret_key() == DEFAULT_SECRET_KEY
    }

    pub fn token_expire_seconds(&self) -> i64 {
        self.config
            .get_int("access_token_expire_minutes")
            .unwrap_or(DEFAULT_TOKEN_EXPIRE_MINUTES)
            * 60
    }

    pub fn google_client_id(&self) -> String {
        self.config.get_string("google_client_id").unwrap_or_default()
    }

    // ========================================================================
    // Email Configuration
    // ========================================================================

    pub fn mail_config(&self) -> MailConfig {
        MailConfig {
            username: self.config.get_string("mail_username").unwrap_or_default(),
            password: self.config.get_string("mail_password").unwrap_or_default(),
            from: self.config.get_string("mail_from").unwrap_or_default(),
            from_name: self
                .config
                .get_string("mail_from_name")
                .unwrap_or("Souq".to_string()),
            server: self
                .config
                .get_string("mail_server")
                .unwrap_or(DEFAULT_MAIL_SERVER.to_string()),
            port: self
                .config
                .get_int("mail_port")
                .unwrap_or(DEFAULT_MAIL_PORT.into()) as u16,
            starttls: self.config.get_bool("mail_starttls").unwrap_or(true),
            ssl_tls: self.config.get_bool("mail_ssl_tls").unwrap_or(false),
            use_credentials: self.config.get_bool("use_credentials").unwrap_or(true),
        }
    }

    /// Accounts signing in with this email are promoted to admin.
    pub fn admin_email(&self) -> String {
        self.config.get_string("mail_username").unwrap_or_default()
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn log_dir(&self) -> Option<String> {
        self.config.get_string("log_dir").ok()
    }
}
