//! HTTP server setup.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::{
    api::{analytics, auth, health, para, products},
    middleware::auth::Authentication,
    model::{AppState, constants::API_CONTEXT_PATH},
};

/// Creates and binds the API server.
///
/// All routes live under [`API_CONTEXT_PATH`]. Every request passes
/// through the authentication middleware, which resolves the bearer
/// token when one is present; the individual handlers decide whether a
/// user is required.
pub fn api_server(
    app_state: Arc<AppState>,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .wrap(Authentication)
            .app_data(web::Data::from(app_state.clone()))
            .service(
                web::scope(API_CONTEXT_PATH)
                    .service(health::routes())
                    .service(auth::routes())
                    .service(products::routes())
                    .service(para::routes())
                    .service(analytics::routes()),
            )
    })
    .bind((address, port))?
    .run())
}
