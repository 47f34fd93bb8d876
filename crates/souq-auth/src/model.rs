//! Authentication models
//!
//! Data structures for JWT payloads, token responses, and the per-request
//! auth context filled in by the HTTP middleware.

use serde::{Deserialize, Serialize};

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const TOKEN_PREFIX: &str = "Bearer ";
pub const ACCESS_TOKEN_PARAM: &str = "accessToken";
pub const TOKEN_TYPE_BEARER: &str = "bearer";
pub const CREDENTIALS_ERROR_MESSAGE: &str = "Could not validate credentials";

/// JWT claims: the subject is the user's email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtPayload {
    pub sub: String,
    pub exp: i64,
}

/// Access token response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub role: String,
}

impl Token {
    pub fn bearer(access_token: String, role: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            role,
        }
    }
}

/// Auth context passed through request extensions. A missing, invalid,
/// or expired token all leave `email` empty; handlers that require a
/// user answer 401 with [`CREDENTIALS_ERROR_MESSAGE`] without
/// distinguishing the cases.
#[derive(Debug, Default, Clone)]
pub struct AuthContext {
    /// Email from a successfully validated token, empty otherwise.
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_constants() {
        assert_eq!(AUTHORIZATION_HEADER, "Authorization");
        assert_eq!(TOKEN_PREFIX, "Bearer ");
        assert_eq!(ACCESS_TOKEN_PARAM, "accessToken");
        assert_eq!(TOKEN_TYPE_BEARER, "bearer");
    }

    #[test]
    fn test_token_bearer() {
        let token = Token::bearer("abc".to_string(), "client".to_string());
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.role, "client");
    }

    #[test]
    fn test_auth_context_default_is_anonymous() {
        assert!(AuthContext::default().email.is_empty());
    }
}
