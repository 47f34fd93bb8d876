//! Error types for Souq
//!
//! `SouqError` is the application-specific error enum. Service code that has
//! nothing specific to report propagates `anyhow::Error` instead; the HTTP
//! layer turns either into a response body.

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum SouqError {
    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("email '{0}' already registered")]
    EmailAlreadyRegistered(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("authentication error: {0}")]
    AuthError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("mail error: {0}")]
    MailError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_souq_error_display() {
        let err = SouqError::IllegalArgument("invalid param".to_string());
        assert_eq!(format!("{}", err), "caused: invalid param");

        let err = SouqError::UserNotFound("client@example.com".to_string());
        assert_eq!(format!("{}", err), "user 'client@example.com' not found");

        let err = SouqError::AuthError("token expired".to_string());
        assert_eq!(format!("{}", err), "authentication error: token expired");
    }

    #[test]
    fn test_souq_error_into_anyhow() {
        let err: anyhow::Error = SouqError::DatabaseError("connection refused".to_string()).into();
        assert!(err.to_string().contains("connection refused"));
        assert!(err.downcast_ref::<SouqError>().is_some());
    }
}
