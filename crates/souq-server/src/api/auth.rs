//! Account routes under `/auth`: signup, signin, email verification,
//! password recovery, profile management, and Google sign-in.

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Scope, get, post, put, web};
use mongodb::bson::{DateTime, Document, doc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::Validate;

use souq_auth::model::{AuthContext, CREDENTIALS_ERROR_MESSAGE, Token};
use souq_auth::service::{password, token::encode_jwt_token};
use souq_persistence::{ROLE_ADMIN, UserDocument};

use crate::model::constants::RESET_CODE_EXPIRE_MINUTES;
use crate::model::{AppState, response};

pub fn routes() -> Scope {
    web::scope("/auth")
        .service(signup)
        .service(signin)
        .service(verify_email)
        .service(forgot_password)
        .service(reset_password)
        .service(me)
        .service(update_profile)
        .service(change_password)
        .service(google_login)
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
struct SignupRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8, max = 64))]
    password: String,
    // Accepted for API compatibility; public signup always creates clients
    #[serde(default)]
    #[allow(dead_code)]
    role: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct SigninRequest {
    #[validate(email)]
    email: String,
    password: String,
}

#[derive(Debug, Deserialize, Validate)]
struct VerifyEmailRequest {
    #[validate(email)]
    email: String,
    code: String,
}

#[derive(Debug, Deserialize, Validate)]
struct EmailRequest {
    #[validate(email)]
    email: String,
}

#[derive(Debug, Deserialize, Validate)]
struct PasswordResetRequest {
    #[validate(email)]
    email: String,
    #[validate(length(equal = 6))]
    code: String,
    #[validate(length(min = 8))]
    new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
struct ProfileUpdateRequest {
    full_name: Option<String>,
    username: Option<String>,
    #[validate(email)]
    email: Option<String>,
    birthdate: Option<String>,
    address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct ChangePasswordRequest {
    current_password: String,
    #[validate(length(min = 8, max = 64))]
    new_password: String,
}

#[derive(Debug, Deserialize)]
struct GoogleLoginRequest {
    credential: String,
}

/// Public view of a user account. Never exposes the password hash or
/// pending verification codes.
#[derive(Debug, Serialize)]
struct UserProfile {
    id: Option<String>,
    email: String,
    role: String,
    full_name: Option<String>,
    username: Option<String>,
    birthdate: Option<String>,
    address: Option<String>,
    is_active: bool,
    is_verified: bool,
    picture: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<&UserDocument> for UserProfile {
    fn from(user: &UserDocument) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()),
            email: user.email.clone(),
            role: user.role.clone(),
            full_name: user.full_name.clone(),
            username: user.username.clone(),
            birthdate: user.birthdate.clone(),
            address: user.address.clone(),
            is_active: user.is_active,
            is_verified: user.is_verified,
            picture: user.picture.clone(),
            created_at: user.created_at.try_to_rfc3339_string().unwrap_or_default(),
            updated_at: user.updated_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Six hex characters, mailed on signup.
fn new_verification_code() -> String {
    let mut bytes = [0u8; 3];
    rand::rng().fill(&mut bytes);
    const_hex::encode(bytes)
}

/// Six decimal digits, mailed on password reset.
fn new_reset_code() -> String {
    rand::rng().random_range(100_000..=999_999).to_string()
}

fn reset_code_expiry() -> DateTime {
    let expires = chrono::Utc::now() + chrono::Duration::minutes(RESET_CODE_EXPIRE_MINUTES);
    DateTime::from_millis(expires.timestamp_millis())
}

/// Resolve the authenticated user from the request's AuthContext.
async fn authenticated_user(
    req: &HttpRequest,
    data: &web::Data<AppState>,
) -> Result<UserDocument, HttpResponse> {
    let context = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .unwrap_or_default();

    if context.email.is_empty() {
        return Err(response::unauthorized(CREDENTIALS_ERROR_MESSAGE));
    }

    match data.users.find_by_email(&context.email).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(response::unauthorized(CREDENTIALS_ERROR_MESSAGE)),
        Err(e) => {
            error!("Failed to load user '{}': {}", context.email, e);
            Err(response::internal_error(e.to_string()))
        }
    }
}

fn token_response(data: &web::Data<AppState>, email: &str, role: &str) -> HttpResponse {
    let secret_key = data.configuration.secret_key();
    let expire_seconds = data.configuration.token_expire_seconds();

    match encode_jwt_token(email, &secret_key, expire_seconds) {
        Ok(access_token) => HttpResponse::Ok().json(Token::bearer(access_token, role.to_string())),
        Err(e) => {
            error!("Failed to generate token for '{}': {}", email, e);
            response::internal_error("Failed to generate token")
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[post("/signup")]
async fn signup(data: web::Data<AppState>, body: web::Json<SignupRequest>) -> HttpResponse {
    if let Err(e) = body.validate() {
        return response::bad_request(e.to_string());
    }

    match data.users.find_by_email(&body.email).await {
        Ok(Some(_)) => return response::bad_request("Email already registered"),
        Ok(None) => {}
        Err(e) => return response::internal_error(e.to_string()),
    }

    let password_hash = match password::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => return response::internal_error(e.to_string()),
    };

    let verification_code = new_verification_code();
    let mut user = UserDocument::new(body.email.clone(), password_hash);
    user.verification_code = Some(verification_code.clone());

    match data.users.insert(&user).await {
        Ok(id) => user.id = Some(id),
        Err(e) => return response::internal_error(e.to_string()),
    }

    let email_service = data.email.clone();
    let recipient = body.email.clone();
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_verification_email(&recipient, &verification_code)
            .await
        {
            error!("Failed to send verification email to {}: {}", recipient, e);
        }
    });

    HttpResponse::Ok().json(UserProfile::from(&user))
}

#[post("/signin")]
async fn signin(data: web::Data<AppState>, body: web::Json<SigninRequest>) -> HttpResponse {
    let user = match data.users.find_by_email(&body.email).await {
        Ok(Some(user)) => user,
        Ok(None) => return response::bad_request("Incorrect email or password"),
        Err(e) => return response::internal_error(e.to_string()),
    };

    if !password::verify_password(&body.password, &user.password_hash) {
        return response::bad_request("Incorrect email or password");
    }

    if !user.is_verified {
        return response::bad_request("Email not verified");
    }

    token_response(&data, &user.email, &user.role)
}

#[post("/verify-email")]
async fn verify_email(data: web::Data<AppState>, body: web::Json<VerifyEmailRequest>) -> HttpResponse {
    let user = match data.users.find_by_email(&body.email).await {
        Ok(Some(user)) => user,
        Ok(None) => return response::bad_request("User not found"),
        Err(e) => return response::internal_error(e.to_string()),
    };

    if user.verification_code.as_deref() != Some(body.code.as_str()) {
        return response::bad_request("Invalid verification code");
    }

    if let Err(e) = data.users.mark_verified(&body.email).await {
        return response::internal_error(e.to_string());
    }

    response::message("Email verified successfully")
}

#[post("/forgot-password")]
async fn forgot_password(data: web::Data<AppState>, body: web::Json<EmailRequest>) -> HttpResponse {
    // Same response either way so valid emails cannot be probed
    let neutral = "If email exists, a verification code will be sent";

    match data.users.find_by_email(&body.email).await {
        Ok(Some(_)) => {}
        Ok(None) => return response::message(neutral),
        Err(e) => return response::internal_error(e.to_string()),
    }

    let reset_code = new_reset_code();
    if let Err(e) = data
        .users
        .set_reset_code(&body.email, &reset_code, reset_code_expiry())
        .await
    {
        return response::internal_error(e.to_string());
    }

    let email_service = data.email.clone();
    let recipient = body.email.clone();
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_reset_password_email(&recipient, &reset_code)
            .await
        {
            error!("Failed to send reset email to {}: {}", recipient, e);
        }
    });

    response::message(neutral)
}

#[post("/reset-password")]
async fn reset_password(
    data: web::Data<AppState>,
    body: web::Json<PasswordResetRequest>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return response::bad_request(e.to_string());
    }

    let user = match data.users.find_by_email(&body.email).await {
        Ok(Some(user)) => user,
        Ok(None) => return response::bad_request("Invalid email or verification code"),
        Err(e) => return response::internal_error(e.to_string()),
    };

    if user.reset_code.as_deref() != Some(body.code.as_str()) {
        return response::bad_request("Invalid email or verification code");
    }

    match user.reset_code_expires {
        Some(expires) if expires >= DateTime::now() => {}
        _ => return response::bad_request("Verification code has expired"),
    }

    let Some(user_id) = user.id else {
        return response::internal_error("User record has no id");
    };

    let password_hash = match password::hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(e) => return response::internal_error(e.to_string()),
    };

    if let Err(e) = data.users.reset_password(user_id, &password_hash).await {
        return response::internal_error(e.to_string());
    }

    response::message("Password reset successfully")
}

#[get("/me")]
async fn me(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    match authenticated_user(&req, &data).await {
        Ok(user) => HttpResponse::Ok().json(UserProfile::from(&user)),
        Err(response) => response,
    }
}

#[put("/profile")]
async fn update_profile(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<ProfileUpdateRequest>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return response::bad_request(e.to_string());
    }

    let user = match authenticated_user(&req, &data).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Some(user_id) = user.id else {
        return response::internal_error("User record has no id");
    };

    if let Some(new_email) = &body.email
        && *new_email != user.email
    {
        match data.users.find_by_email(new_email).await {
            Ok(Some(_)) => return response::bad_request("Email already registered"),
            Ok(None) => {}
            Err(e) => return response::internal_error(e.to_string()),
        }
    }

    let mut set = Document::new();
    if let Some(v) = &body.full_name {
        set.insert("full_name", v.as_str());
    }
    if let Some(v) = &body.username {
        set.insert("username", v.as_str());
    }
    if let Some(v) = &body.email {
        set.insert("email", v.as_str());
    }
    if let Some(v) = &body.birthdate {
        set.insert("birthdate", v.as_str());
    }
    if let Some(v) = &body.address {
        set.insert("address", v.as_str());
    }
    set.insert("updated_at", DateTime::now());

    match data.users.update_fields(user_id, set).await {
        Ok(true) => {}
        Ok(false) => return response::not_found("User not found"),
        Err(e) => return response::internal_error(e.to_string()),
    }

    match data.users.find_by_id(user_id).await {
        Ok(Some(updated)) => HttpResponse::Ok().json(UserProfile::from(&updated)),
        Ok(None) => response::not_found("User data not found after update"),
        Err(e) => response::internal_error(e.to_string()),
    }
}

#[put("/change-password")]
async fn change_password(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<ChangePasswordRequest>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return response::bad_request(e.to_string());
    }

    let user = match authenticated_user(&req, &data).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Some(user_id) = user.id else {
        return response::internal_error("User record has no id");
    };

    if !password::verify_password(&body.current_password, &user.password_hash) {
        return response::bad_request("Incorrect current password");
    }

    let password_hash = match password::hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(e) => return response::internal_error(e.to_string()),
    };

    if let Err(e) = data.users.set_password(user_id, &password_hash).await {
        return response::internal_error(e.to_string());
    }

    response::message("Password updated successfully")
}

#[post("/google")]
async fn google_login(data: web::Data<AppState>, body: web::Json<GoogleLoginRequest>) -> HttpResponse {
    if !data.google.is_configured() {
        return response::bad_request("Google sign-in is not configured");
    }

    let claims = match data.google.verify(&body.credential).await {
        Ok(claims) => claims,
        Err(e) => return response::bad_request(format!("Invalid Google token: {}", e)),
    };

    let admin_email = data.configuration.admin_email();

    let existing = match data.users.find_by_email(&claims.email).await {
        Ok(user) => user,
        Err(e) => return response::internal_error(e.to_string()),
    };

    let role = match existing {
        None => {
            // First sign-in: provision an already-verified account with a
            // random local password
            let password_hash = match password::hash_password(&password::random_password()) {
                Ok(hash) => hash,
                Err(e) => return response::internal_error(e.to_string()),
            };

            let mut user = UserDocument::new(claims.email.clone(), password_hash);
            user.is_verified = true;
            user.google_id = Some(claims.sub);
            user.picture = claims.picture;
            user.full_name = claims.name;
            if claims.email == admin_email {
                user.role = ROLE_ADMIN.to_string();
            }

            if let Err(e) = data.users.insert(&user).await {
                return response::internal_error(e.to_string());
            }
            user.role
        }
        Some(user) => {
            let Some(user_id) = user.id else {
                return response::internal_error("User record has no id");
            };

            let mut set = Document::new();
            if user.google_id.is_none() {
                set.insert("google_id", claims.sub.as_str());
            }
            if user.picture.is_none()
                && let Some(picture) = &claims.picture
            {
                set.insert("picture", picture.as_str());
            }
            if !user.is_verified {
                set.insert("is_verified", true);
            }

            let mut role = user.role.clone();
            if claims.email == admin_email && role != ROLE_ADMIN {
                set.insert("role", ROLE_ADMIN);
                role = ROLE_ADMIN.to_string();
            }

            if !set.is_empty()
                && let Err(e) = data.users.update_fields(user_id, set).await
            {
                return response::internal_error(e.to_string());
            }
            role
        }
    };

    token_response(&data, &claims.email, &role)
}

#[cfg(test)]
mod tests {
    use souq_persistence::ROLE_CLIENT;

    use super::*;

    #[test]
    fn test_verification_code_shape() {
        let code = new_verification_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_reset_code_shape() {
        for _ in 0..20 {
            let code = new_reset_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_reset_code_expiry_is_in_the_future() {
        assert!(reset_code_expiry() > DateTime::now());
    }

    #[test]
    fn test_user_profile_hides_credentials() {
        let mut user = UserDocument::new("a@b.tn".to_string(), "$2b$12$secret".to_string());
        user.verification_code = Some("abc123".to_string());
        user.reset_code = Some("123456".to_string());
        user.role = ROLE_CLIENT.to_string();

        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert_eq!(json["email"], "a@b.tn");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("verification_code").is_none());
        assert!(json.get("reset_code").is_none());
    }

    #[test]
    fn test_signup_request_validation() {
        let short: SignupRequest =
            serde_json::from_str(r#"{"email": "a@b.tn", "password": "short"}"#).unwrap();
        assert!(short.validate().is_err());

        let bad_email: SignupRequest =
            serde_json::from_str(r#"{"email": "not-an-email", "password": "longenough"}"#).unwrap();
        assert!(bad_email.validate().is_err());

        let ok: SignupRequest =
            serde_json::from_str(r#"{"email": "a@b.tn", "password": "longenough"}"#).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_password_reset_request_validation() {
        let bad_code: PasswordResetRequest = serde_json::from_str(
            r#"{"email": "a@b.tn", "code": "12345", "new_password": "longenough"}"#,
        )
        .unwrap();
        assert!(bad_code.validate().is_err());

        let ok: PasswordResetRequest = serde_json::from_str(
            r#"{"email": "a@b.tn", "code": "123456", "new_password": "longenough"}"#,
        )
        .unwrap();
        assert!(ok.validate().is_ok());
    }
}
