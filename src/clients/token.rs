//! Access token provider: OAuth2 JWT-bearer exchange against the credential
//! set's token endpoint, with an expiry-aware cache per client.

use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{Algorithm, Header};
use serde::{Deserialize, Serialize};

use crate::core::GatewayError;

use super::EnvironmentClient;

const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Scopes accepted by the Identity Toolkit OOB-code endpoint.
const TOKEN_SCOPES: &str =
    "https://www.googleapis.com/auth/identitytoolkit https://www.googleapis.com/auth/cloud-platform";

const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens within this margin of expiry are treated as already expired.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub(crate) struct CachedToken {
    pub(crate) value: String,
    pub(crate) expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl EnvironmentClient {
    /// Returns a currently-valid bearer token, refreshing when the cached
    /// one is expired or about to expire.
    ///
    /// The fetch happens without holding the cache lock, and the cache is
    /// only written on confirmed success: a failed refresh never evicts a
    /// still-valid prior token and never blocks other callers from retrying.
    /// Concurrent callers observing an expired token may each fetch; the
    /// cache converges on the last successful write.
    pub async fn access_token(&self) -> Result<String, GatewayError> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.is_fresh() {
                    return Ok(token.value.clone());
                }
            }
        }

        let fetched = self.fetch_token().await?;
        let value = fetched.value.clone();
        *self.token.write().await = Some(fetched);
        Ok(value)
    }

    fn signed_assertion(&self) -> Result<String, GatewayError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.credentials.client_email,
            scope: TOKEN_SCOPES,
            aud: &self.credentials.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| GatewayError::TokenAcquisition(format!("failed to sign assertion: {e}")))
    }

    async fn fetch_token(&self) -> Result<CachedToken, GatewayError> {
        let assertion = self.signed_assertion()?;

        tracing::debug!(environment = %self.environment, "refreshing access token");

        let response = self
            .http
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::TokenAcquisition(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::TokenAcquisition(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::TokenAcquisition(format!("malformed token response: {e}")))?;

        Ok(CachedToken {
            value: parsed.access_token,
            expires_at: Instant::now() + Duration::from_secs(parsed.expires_in),
        })
    }

    /// Test hook: places a token with the given remaining lifetime in the
    /// cache. A zero lifetime yields an already-expired token.
    #[cfg(test)]
    pub(crate) async fn seed_token(&self, value: &str, remaining: Duration) {
        *self.token.write().await = Some(CachedToken {
            value: value.to_string(),
            expires_at: Instant::now() + remaining,
        });
    }

    #[cfg(test)]
    pub(crate) async fn cached_token(&self) -> Option<CachedToken> {
        self.token.read().await.clone()
    }
}
