//! Per-environment identity clients and the registry that lazily
//! constructs them.
//!
//! One [`EnvironmentClient`] exists per [`Environment`] for the lifetime of
//! the process. The registry guards first construction with a per-environment
//! `OnceCell`, so concurrent first requests build exactly one client and
//! environments initialize independently. Construction failures are not
//! cached; a later call retries from scratch.

pub mod token;


use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::EncodingKey;
use tokio::sync::{OnceCell, RwLock};

use crate::config::{Environment, GatewayConfig, ServiceAccountCredentials};
use crate::core::GatewayError;
use token::CachedToken;

/// An authenticated handle bound to one credential set and one environment.
pub struct EnvironmentClient {
    environment: Environment,
    credentials: ServiceAccountCredentials,
    signing_key: EncodingKey,
    http: reqwest::Client,
    token: RwLock<Option<CachedToken>>,
}

impl std::fmt::Debug for EnvironmentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentClient")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl EnvironmentClient {
    fn new(
        environment: Environment,
        credentials: ServiceAccountCredentials,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let signing_key =
            EncodingKey::from_rsa_pem(credentials.private_key.as_bytes()).map_err(|e| {
                GatewayError::Initialization {
                    environment: environment.to_string(),
                    reason: format!("invalid private key: {e}"),
                }
            })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Initialization {
                environment: environment.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            environment,
            credentials,
            signing_key,
            http,
            token: RwLock::new(None),
        })
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn project_id(&self) -> &str {
        &self.credentials.project_id
    }

    /// The shared HTTP client, timeout-bounded at construction.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Lazily constructs and caches one [`EnvironmentClient`] per environment.
pub struct ClientRegistry {
    config: Arc<GatewayConfig>,
    test: OnceCell<Arc<EnvironmentClient>>,
    prod: OnceCell<Arc<EnvironmentClient>>,
}

impl ClientRegistry {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self {
            config,
            test: OnceCell::new(),
            prod: OnceCell::new(),
        }
    }

    /// Returns the client for `environment`, constructing it on first use.
    ///
    /// Fails with [`GatewayError::Configuration`] when mandatory credential
    /// fields are missing and [`GatewayError::Initialization`] when
    /// construction itself fails; neither outcome is cached.
    pub async fn client(
        &self,
        environment: Environment,
    ) -> Result<Arc<EnvironmentClient>, GatewayError> {
        let cell = match environment {
            Environment::Test => &self.test,
            Environment::Prod => &self.prod,
        };

        cell.get_or_try_init(|| async { self.build(environment) })
            .await
            .cloned()
    }

    fn build(&self, environment: Environment) -> Result<Arc<EnvironmentClient>, GatewayError> {
        let credentials = self.config.credentials(environment);
        credentials.validate(environment)?;

        let client = EnvironmentClient::new(
            environment,
            credentials.clone(),
            self.config.http_timeout,
        )?;

        tracing::info!(
            environment = %environment,
            project_id = %client.credentials.project_id,
            "identity client initialized"
        );

        Ok(Arc::new(client))
    }
}
