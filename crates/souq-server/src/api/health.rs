use actix_web::{Responder, Scope, get, web};
use serde::Serialize;

use crate::model::AppState;

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: String,
    pub db_connected: bool,
}

pub fn routes() -> Scope {
    web::scope("/health").service(health_check)
}

#[get("")]
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let db_connected = data.store.ping().await;
    web::Json(HealthCheck {
        status: "ok".to_string(),
        db_connected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_serialization() {
        let health = HealthCheck {
            status: "ok".to_string(),
            db_connected: true,
        };
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["db_connected"], true);
    }
}
