//! Crate-wide error taxonomy and the Identity Platform error body shape.
//!
//! Every failure path in the gateway returns one of these variants; the
//! hosting request layer maps them to HTTP responses via [`GatewayError::status_code`].

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Mandatory credential fields are absent. Fatal, never retried.
    #[error("invalid configuration for {environment}: {missing}")]
    Configuration { environment: String, missing: String },

    /// Client construction failed (malformed key material and the like).
    /// Transient; the registry does not cache it and a later call may retry.
    #[error("failed to initialize {environment} identity client: {reason}")]
    Initialization { environment: String, reason: String },

    /// The token endpoint could not be reached or rejected the assertion.
    #[error("failed to acquire access token: {0}")]
    TokenAcquisition(String),

    /// No account exists for the email. Expected, a 404-equivalent.
    #[error("user with email {email} not found")]
    UserNotFound { email: String },

    /// Provider-side rejection unrelated to a missing user; the provider's
    /// message is passed through for diagnostics.
    #[error("identity provider rejected the request: {0}")]
    ProviderApi(String),

    /// A success response without the fields the contract promises.
    #[error("malformed identity provider response: {0}")]
    ProviderProtocol(String),

    /// Network failure or timeout. Retryable by the caller, never here.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The email transport collaborator reported a delivery failure.
    #[error("email delivery failed: {0}")]
    EmailDelivery(String),

    /// The caller is not associated with any known product.
    #[error("unknown product: {0}")]
    UnknownProduct(String),
}

impl GatewayError {
    /// HTTP-equivalent status class for the hosting request layer.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::UserNotFound { .. } => 404,
            GatewayError::UnknownProduct(_) => 403,
            GatewayError::Configuration { .. } => 500,
            GatewayError::Initialization { .. } => 503,
            GatewayError::Transport(_) => 504,
            GatewayError::TokenAcquisition(_)
            | GatewayError::ProviderApi(_)
            | GatewayError::ProviderProtocol(_)
            | GatewayError::EmailDelivery(_) => 502,
        }
    }

    /// Whether the caller may reasonably retry the whole request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Initialization { .. }
                | GatewayError::TokenAcquisition(_)
                | GatewayError::Transport(_)
        )
    }
}

/// Error body the Identity Platform returns on non-2xx responses:
/// `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct ProviderErrorResponse {
    pub error: ProviderErrorDetails,
}

#[derive(Debug, Deserialize)]
pub struct ProviderErrorDetails {
    pub message: String,
    pub code: Option<u16>,
    pub status: Option<String>,
}

/// Maps a non-2xx provider response body to the taxonomy. Messages naming a
/// missing account become [`GatewayError::UserNotFound`]; everything else is
/// passed through as [`GatewayError::ProviderApi`], falling back to the HTTP
/// status when the body is not the documented shape.
pub fn classify_provider_error(
    status: reqwest::StatusCode,
    body: &str,
    email: &str,
) -> GatewayError {
    match serde_json::from_str::<ProviderErrorResponse>(body) {
        Ok(parsed) => {
            let message = parsed.error.message;
            if message.contains("EMAIL_NOT_FOUND") || message.contains("USER_NOT_FOUND") {
                GatewayError::UserNotFound {
                    email: email.to_string(),
                }
            } else {
                GatewayError::ProviderApi(message)
            }
        }
        Err(_) => GatewayError::ProviderApi(format!("request failed with status {status}")),
    }
}
