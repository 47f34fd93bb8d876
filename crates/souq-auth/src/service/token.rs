//! JWT token service

use std::sync::LazyLock;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use moka::sync::Cache;

use crate::model::JwtPayload;

/// JWT token cache to avoid repeated validation of the same token
static TOKEN_CACHE: LazyLock<Cache<String, JwtPayload>> = LazyLock::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes TTL
        .build()
});

/// Decode and validate a JWT token with caching
pub fn decode_jwt_token_cached(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<JwtPayload>> {
    if let Some(claims) = TOKEN_CACHE.get(token) {
        let now = chrono::Utc::now().timestamp();
        if claims.exp > now {
            return Ok(jsonwebtoken::TokenData {
                header: Header::default(),
                claims,
            });
        }
        // Token expired in cache, invalidate it
        TOKEN_CACHE.invalidate(token);
    }

    let result = decode_jwt_token(token, secret_key)?;

    TOKEN_CACHE.insert(token.to_string(), result.claims.clone());

    Ok(result)
}

/// Decode and validate a JWT token without caching
pub fn decode_jwt_token(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<JwtPayload>> {
    let decoding_key = DecodingKey::from_secret(secret_key.as_bytes());
    decode::<JwtPayload>(token, &decoding_key, &Validation::default())
}

/// Encode a JWT token with the user's email as subject
pub fn encode_jwt_token(
    sub: &str,
    secret_key: &str,
    expire_seconds: i64,
) -> jsonwebtoken::errors::Result<String> {
    let exp = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(expire_seconds))
        .unwrap_or_else(chrono::Utc::now)
        .timestamp();

    let payload = JwtPayload {
        sub: sub.to_string(),
        exp,
    };

    let encoding_key = EncodingKey::from_secret(secret_key.as_bytes());
    encode(&Header::new(Algorithm::HS256), &payload, &encoding_key)
}
