//! Tenant-scoped out-of-band link issuance.
//!
//! The offered Admin SDK surface has no tenant support for OOB links, so the
//! issuer calls the Identity Toolkit REST endpoint directly: bearer token
//! from the environment client, tenant id as a query parameter, and
//! `returnOobLink` so the link comes back in the response instead of being
//! emailed by the provider.

pub mod models;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use reqwest::header;
use url::Url;

use crate::clients::ClientRegistry;
use crate::config::Environment;
use crate::core::{classify_provider_error, GatewayError};
use models::{OobCodeRequest, OobCodeResponse};

/// Which out-of-band action link to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    PasswordReset,
    EmailVerification,
}

impl LinkKind {
    /// Wire value of the `requestType` field.
    pub fn request_type(&self) -> &'static str {
        match self {
            LinkKind::PasswordReset => "PASSWORD_RESET",
            LinkKind::EmailVerification => "VERIFY_EMAIL",
        }
    }
}

/// Issues password-reset and email-verification links for one email, tenant
/// and environment. Single-shot per call; retry policy belongs to the caller.
#[derive(Clone)]
pub struct LinkIssuer {
    registry: Arc<ClientRegistry>,
    endpoint: String,
}

impl LinkIssuer {
    pub fn new(registry: Arc<ClientRegistry>, endpoint: impl Into<String>) -> Self {
        Self {
            registry,
            endpoint: endpoint.into(),
        }
    }

    pub async fn password_reset_link(
        &self,
        email: &str,
        tenant_id: &str,
        environment: Environment,
    ) -> Result<String, GatewayError> {
        self.issue_link(LinkKind::PasswordReset, email, tenant_id, environment)
            .await
    }

    pub async fn email_verification_link(
        &self,
        email: &str,
        tenant_id: &str,
        environment: Environment,
    ) -> Result<String, GatewayError> {
        self.issue_link(LinkKind::EmailVerification, email, tenant_id, environment)
            .await
    }

    /// Issues one OOB link. Resolves the environment client, acquires a
    /// bearer token, POSTs to the OOB-code endpoint and extracts `oobLink`
    /// from the response.
    pub async fn issue_link(
        &self,
        kind: LinkKind,
        email: &str,
        tenant_id: &str,
        environment: Environment,
    ) -> Result<String, GatewayError> {
        let client = self.registry.client(environment).await?;
        let token = client.access_token().await?;

        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| GatewayError::ProviderProtocol(format!("invalid OOB endpoint: {e}")))?;
        if !tenant_id.is_empty() {
            url.query_pairs_mut().append_pair("tenantId", tenant_id);
        }

        let body = OobCodeRequest {
            request_type: kind.request_type(),
            email,
            return_oob_link: true,
        };

        let response = client
            .http()
            .post(url)
            .bearer_auth(&token)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = classify_provider_error(status, &text, email);
            match &err {
                GatewayError::UserNotFound { email } => {
                    tracing::warn!(email = %email, environment = %environment, "user not found");
                }
                other => {
                    tracing::warn!(
                        environment = %environment,
                        status = status.as_u16(),
                        error = %other,
                        "OOB link request rejected"
                    );
                }
            }
            return Err(err);
        }

        let parsed: OobCodeResponse = response.json().await.map_err(|e| {
            GatewayError::ProviderProtocol(format!("unparseable success body: {e}"))
        })?;

        let link = parsed.oob_link.ok_or_else(|| {
            GatewayError::ProviderProtocol("response is missing the oobLink field".to_string())
        })?;

        tracing::info!(
            kind = kind.request_type(),
            email = %email,
            environment = %environment,
            tenant_id = %tenant_id,
            "OOB link issued"
        );

        Ok(link)
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Transport(format!("request timed out: {e}"))
    } else {
        GatewayError::Transport(e.to_string())
    }
}
