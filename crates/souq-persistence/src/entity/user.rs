//! User account document
//!
//! Stored in the `users` collection of the auth database. Optional fields
//! are written as-is; booleans and timestamps get sensible defaults when a
//! document predates a field.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_ADMIN: &str = "admin";

fn default_role() -> String {
    ROLE_CLIENT.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub verification_code: Option<String>,
    #[serde(default)]
    pub reset_code: Option<String>,
    #[serde(default)]
    pub reset_code_expires: Option<DateTime>,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
    #[serde(default = "DateTime::now")]
    pub updated_at: DateTime,
}

impl UserDocument {
    /// A fresh, unverified client account.
    pub fn new(email: String, password_hash: String) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            email,
            password_hash,
            role: default_role(),
            full_name: None,
            username: None,
            birthdate: None,
            address: None,
            is_active: true,
            is_verified: false,
            verification_code: None,
            reset_code: None,
            reset_code_expires: None,
            google_id: None,
            picture: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = UserDocument::new(
            "client@example.com".to_string(),
            "$2b$12$hash".to_string(),
        );
        assert_eq!(user.role, ROLE_CLIENT);
        assert!(user.is_active);
        assert!(!user.is_verified);
        assert!(user.id.is_none());
    }

    #[test]
    fn test_deserialize_minimal_document() {
        // Documents written before optional fields existed must still load.
        let raw = doc! {
            "email": "old@example.com",
            "password_hash": "$2b$12$hash",
        };
        let user: UserDocument = mongodb::bson::from_document(raw).unwrap();
        assert_eq!(user.email, "old@example.com");
        assert_eq!(user.role, ROLE_CLIENT);
        assert!(user.is_active);
        assert!(!user.is_verified);
        assert!(user.verification_code.is_none());
    }

    #[test]
    fn test_serialize_skips_missing_id() {
        let user = UserDocument::new("a@b.tn".to_string(), "h".to_string());
        let raw = mongodb::bson::to_document(&user).unwrap();
        assert!(!raw.contains_key("_id"));
        assert_eq!(raw.get_str("role").unwrap(), ROLE_CLIENT);
    }
}
