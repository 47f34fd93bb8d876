//! Shared application state for HTTP handlers.

use souq_auth::service::google::GoogleTokenVerifier;
use souq_catalog::{AnalyticsService, CatalogService};
use souq_persistence::{MongoStore, UserRepository};

use crate::model::Configuration;
use crate::service::email::EmailService;

/// Application state shared across all HTTP workers.
pub struct AppState {
    pub configuration: Configuration,
    pub store: MongoStore,
    pub users: UserRepository,
    pub retail: CatalogService,
    pub para: CatalogService,
    pub analytics: AnalyticsService,
    pub email: EmailService,
    pub google: GoogleTokenVerifier,
}
