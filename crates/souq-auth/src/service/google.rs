//! Google ID token verification
//!
//! Verifies the `credential` JWT posted by the Google sign-in widget:
//! signature against Google's published JWKS (RS256), audience against the
//! configured client id, and issuer against accounts.google.com. The key set
//! is cached and refreshed once on an unknown key id to survive Google's key
//! rotation.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use moka::future::Cache;
use serde::Deserialize;
use tracing::info;

use souq_common::SouqError;

pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];
const JWKS_CACHE_KEY: &str = "google";
const JWKS_TTL_SECONDS: u64 = 3600;

#[derive(Debug, Clone, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    #[serde(default)]
    kid: String,
    n: String,
    e: String,
}

/// Claims extracted from a verified Google ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

pub struct GoogleTokenVerifier {
    client_id: String,
    http_client: reqwest::Client,
    jwks_cache: Cache<&'static str, Jwks>,
}

impl GoogleTokenVerifier {
    pub fn new(client_id: String) -> Self {
        Self {
            client_id,
            http_client: reqwest::Client::new(),
            jwks_cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(JWKS_TTL_SECONDS))
                .build(),
        }
    }

    /// Whether a Google client id has been configured.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
    }

    /// Verify an ID token and return its claims.
    pub async fn verify(&self, id_token: &str) -> Result<GoogleClaims, SouqError> {
        let header = decode_header(id_token)
            .map_err(|e| SouqError::AuthError(format!("malformed ID token: {}", e)))?;
        let kid = header
            .kid
            .ok_or_else(|| SouqError::AuthError("ID token has no key id".to_string()))?;

        let jwk = match self.find_key(&kid, false).await? {
            Some(jwk) => jwk,
            // Key set may have rotated since it was cached
            None => self
                .find_key(&kid, true)
                .await?
                .ok_or_else(|| SouqError::AuthError("unknown signing key".to_string()))?,
        };

        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| SouqError::AuthError(format!("bad signing key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let data = decode::<GoogleClaims>(id_token, &decoding_key, &validation)
            .map_err(|e| SouqError::AuthError(e.to_string()))?;

        Ok(data.claims)
    }

    async fn find_key(&self, kid: &str, force_refresh: bool) -> Result<Option<Jwk>, SouqError> {
        if force_refresh {
            self.jwks_cache.invalidate(JWKS_CACHE_KEY).await;
        }

        let jwks = match self.jwks_cache.get(JWKS_CACHE_KEY).await {
            Some(jwks) => jwks,
            None => {
                let jwks = self.fetch_jwks().await?;
                self.jwks_cache.insert(JWKS_CACHE_KEY, jwks.clone()).await;
                jwks
            }
        };

        Ok(jwks.keys.iter().find(|k| k.kid == kid).cloned())
    }

    async fn fetch_jwks(&self) -> Result<Jwks, SouqError> {
        info!("Fetching Google JWKS from {}", GOOGLE_JWKS_URL);
        let response = self
            .http_client
            .get(GOOGLE_JWKS_URL)
            .send()
            .await
            .map_err(|e| SouqError::AuthError(format!("failed to fetch Google keys: {}", e)))?;

        if !response.status().is_success() {
            return Err(SouqError::AuthError(format!(
                "Google JWKS endpoint returned {}",
                response.status()
            )));
        }

        response
            .json::<Jwks>()
            .await
            .map_err(|e| SouqError::AuthError(format!("invalid JWKS document: {}", e)))
    }
}
