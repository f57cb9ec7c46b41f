//! Request-level orchestrator. Resolves the product's tenant for the
//! requested environment, delegates to the link issuer, and optionally
//! renders and dispatches the branded email once a link is in hand.
//!
//! This is the stable seam the hosting layer depends on; the issuer's
//! REST-vs-SDK strategy can change behind it without affecting callers.


use crate::config::Environment;
use crate::core::GatewayError;
use crate::email::{templates, EmailTransport, OutboundEmail};
use crate::links::{LinkIssuer, LinkKind};
use crate::products::Product;

/// Receipt for a message handed to the email transport.
#[derive(Debug, Clone)]
pub struct LinkDelivery {
    pub message_id: String,
    pub environment: Environment,
    pub product_name: String,
}

#[derive(Clone)]
pub struct LinkService {
    issuer: LinkIssuer,
}

impl LinkService {
    pub fn new(issuer: LinkIssuer) -> Self {
        Self { issuer }
    }

    /// Issues a link for the product's tenant in `environment`. The issuer's
    /// result is passed through unchanged; this method only resolves which
    /// tenant applies.
    pub async fn request_link(
        &self,
        kind: LinkKind,
        email: &str,
        product: &Product,
        environment: Environment,
    ) -> Result<String, GatewayError> {
        let tenant_id = product.tenant_id(environment);
        self.issuer
            .issue_link(kind, email, tenant_id, environment)
            .await
    }

    /// Issues a link, renders the product-branded email and hands it to the
    /// transport. The transport is invoked only after the link was issued.
    pub async fn send_link_email(
        &self,
        transport: &dyn EmailTransport,
        kind: LinkKind,
        email: &str,
        user_name: Option<&str>,
        product: &Product,
        environment: Environment,
    ) -> Result<LinkDelivery, GatewayError> {
        let link = self.request_link(kind, email, product, environment).await?;

        let rendered = match kind {
            LinkKind::PasswordReset => templates::password_reset_email(
                &product.display_name,
                &link,
                environment,
                user_name,
            ),
            LinkKind::EmailVerification => templates::verification_email(
                &product.display_name,
                &link,
                environment,
                user_name,
            ),
        };

        let message = OutboundEmail {
            to: email.to_string(),
            subject: rendered.subject,
            html_body: rendered.html_body,
            text_body: Some(rendered.text_body),
            sender: None,
        };
        let message_id = transport.send(&message).await?;

        tracing::info!(
            email = %email,
            product = %product.display_name,
            environment = %environment,
            message_id = %message_id,
            "link email sent"
        );

        Ok(LinkDelivery {
            message_id,
            environment,
            product_name: product.display_name.clone(),
        })
    }

    /// Welcome email: no link issuance involved. Applies the per-product
    /// sender override when one exists.
    pub async fn send_welcome_email(
        &self,
        transport: &dyn EmailTransport,
        email: &str,
        user_name: Option<&str>,
        product: &Product,
        dashboard_link: &str,
        environment: Environment,
    ) -> Result<LinkDelivery, GatewayError> {
        let rendered = templates::welcome_email(
            &product.display_name,
            dashboard_link,
            environment,
            user_name,
        );

        let message = OutboundEmail {
            to: email.to_string(),
            subject: rendered.subject,
            html_body: rendered.html_body,
            text_body: Some(rendered.text_body),
            sender: templates::welcome_sender(&product.display_name),
        };
        let message_id = transport.send(&message).await?;

        tracing::info!(
            email = %email,
            product = %product.display_name,
            environment = %environment,
            "welcome email sent"
        );

        Ok(LinkDelivery {
            message_id,
            environment,
            product_name: product.display_name.clone(),
        })
    }
}
