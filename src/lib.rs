pub mod clients;
pub mod config;
pub mod core;
pub mod email;
pub mod gateway;
pub mod links;
pub mod products;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use clients::ClientRegistry;
use config::GatewayConfig;
use gateway::LinkService;
use links::LinkIssuer;

/// Entry point: owns the per-environment client registry and hands out the
/// service handles the hosting request layer works with.
pub struct IdentityGateway {
    config: Arc<GatewayConfig>,
    registry: Arc<ClientRegistry>,
}

impl IdentityGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(ClientRegistry::new(Arc::clone(&config)));
        Self { config, registry }
    }

    /// The shared per-environment client registry.
    pub fn registry(&self) -> Arc<ClientRegistry> {
        Arc::clone(&self.registry)
    }

    /// Low-level link issuer, bound to the configured OOB endpoint.
    pub fn links(&self) -> LinkIssuer {
        LinkIssuer::new(Arc::clone(&self.registry), self.config.oob_endpoint.clone())
    }

    /// Request-level orchestrator over the issuer.
    pub fn link_service(&self) -> LinkService {
        LinkService::new(self.links())
    }
}
