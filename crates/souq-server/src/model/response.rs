//! HTTP response envelopes shared by all routes.
//!
//! Errors are reported as `{"detail": "..."}` and informational results
//! as `{"message": "..."}`.

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

/// Error body carried by non-2xx responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Informational body for operations with no payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

pub fn bad_request(detail: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorDetail::new(detail))
}

pub fn not_found(detail: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorDetail::new(detail))
}

pub fn internal_error(detail: impl Into<String>) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorDetail::new(detail))
}

pub fn unauthorized(detail: impl Into<String>) -> HttpResponse {
    HttpResponse::Unauthorized()
        .append_header(("WWW-Authenticate", "Bearer"))
        .json(ErrorDetail::new(detail))
}

pub fn message(text: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiMessage {
        message: text.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_codes() {
        assert_eq!(bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(internal_error("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message("ok").status(), StatusCode::OK);
    }

    #[test]
    fn test_unauthorized_challenge_header() {
        let response = unauthorized("Could not validate credentials");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let header = response.headers().get("WWW-Authenticate").unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer");
    }

    #[test]
    fn test_error_detail_serialization() {
        let body = serde_json::to_value(ErrorDetail::new("Product not found")).unwrap();
        assert_eq!(body["detail"], "Product not found");
    }
}
