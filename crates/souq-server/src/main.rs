//! Main entry point for the Souq price comparison API server.

use std::sync::Arc;
use std::time::Duration;

use souq_auth::service::google::GoogleTokenVerifier;
use souq_catalog::{AnalyticsService, CatalogService, PARA, RETAIL};
use souq_persistence::{MongoStore, UserRepository};
use souq_server::{
    model::{AppState, Configuration, constants::PROJECT_NAME},
    service::EmailService,
    startup::{self, GracefulShutdown, LoggingConfig},
};
use tracing::{error, info, warn};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = Configuration::new();

    let logging_config = LoggingConfig::from_config(configuration.log_dir());
    let _logging_guard = startup::init_logging(&logging_config)?;

    if configuration.is_default_secret_key() {
        warn!("SECRET_KEY is not set, using the built-in default. Do not run this in production.");
    }

    let server_address = configuration.server_address();
    let server_port = configuration.server_port();

    let store = MongoStore::connect(
        &configuration.mongo_uri()?,
        &configuration.db_name(),
        &configuration.auth_db_name(),
    )
    .await?;

    let users = UserRepository::new(&store.auth_database());
    let retail = CatalogService::new(store.client(), &RETAIL);
    let para = CatalogService::new(store.client(), &PARA);
    let analytics = AnalyticsService::new(store.client().clone());
    let email = EmailService::new(&configuration.mail_config())?;
    let google = GoogleTokenVerifier::new(configuration.google_client_id());

    let app_state = Arc::new(AppState {
        configuration,
        store,
        users,
        retail,
        para,
        analytics,
        email,
        google,
    });

    let shutdown_signal = startup::wait_for_shutdown_signal().await;
    let graceful_shutdown = GracefulShutdown::new(shutdown_signal, Duration::from_secs(30));

    info!(
        "Starting {} on {}:{}",
        PROJECT_NAME, server_address, server_port
    );
    let server = startup::api_server(app_state, server_address, server_port)?;

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = graceful_shutdown.wait_for_shutdown() => {
            info!("Server shutting down gracefully");
        }
    }

    info!("Souq server shutdown complete");
    Ok(())
}
