//! MongoDB client lifecycle
//!
//! One `MongoStore` is created at startup from `MONGO_URI` and shared across
//! all services. Connectivity is verified with an admin `ping` before the
//! server starts accepting requests.

use anyhow::Context;
use mongodb::{Client, Database, bson::doc};
use tracing::{error, info};

/// Shared MongoDB client with named database handles.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db_name: String,
    auth_db_name: String,
}

impl MongoStore {
    /// Connect to MongoDB and verify the connection with an admin ping.
    pub async fn connect(uri: &str, db_name: &str, auth_db_name: &str) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("invalid MongoDB connection string")?;

        let store = Self {
            client,
            db_name: db_name.to_string(),
            auth_db_name: auth_db_name.to_string(),
        };

        match store.admin_ping().await {
            Ok(()) => {
                info!("Connected to MongoDB");
                Ok(store)
            }
            Err(e) => {
                error!("Could not connect to MongoDB: {}", e);
                Err(e)
            }
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The primary catalog database.
    pub fn database(&self) -> Database {
        self.client.database(&self.db_name)
    }

    /// The database holding user accounts.
    pub fn auth_database(&self) -> Database {
        self.client.database(&self.auth_db_name)
    }

    /// Ping the server, reporting reachability as a boolean.
    ///
    /// Used by the health endpoint: a failed ping is logged and reported as
    /// `db_connected: false`, never as an HTTP error.
    pub async fn ping(&self) -> bool {
        match self.admin_ping().await {
            Ok(()) => true,
            Err(e) => {
                error!("Health check DB ping failed: {}", e);
                false
            }
        }
    }

    async fn admin_ping(&self) -> anyhow::Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}
