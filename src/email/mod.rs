//! Outbound email seam. The gateway renders subject/HTML/text and hands the
//! message to an [`EmailTransport`] implementation supplied by the hosting
//! application; no concrete provider client ships with this crate.

pub mod templates;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::GatewayError;

/// Sender identity override, e.g. a named per-product sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSender {
    pub email: String,
    pub name: String,
}

/// A fully rendered message ready for the transport.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    /// `None` means the transport's default sender applies.
    pub sender: Option<EmailSender>,
}

/// Transactional email transport. Implementations return the provider's
/// message id on success.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<String, GatewayError>;
}
