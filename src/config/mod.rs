//! Startup-time configuration: per-environment service account credentials
//! and the endpoint/timeout settings shared by all outbound calls.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::GatewayError;

/// Default out-of-band code endpoint of the Identity Platform REST API.
pub const DEFAULT_OOB_ENDPOINT: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:sendOobCode";

/// Default Google OAuth2 token endpoint, used when the credential JSON
/// carries no `token_uri` of its own.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Deployment environment. Each value selects its own credential set,
/// project and tenant mapping; a request never straddles both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Test,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }

    /// Human-readable label used in response messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Environment::Test => "test environment",
            Environment::Prod => "production environment",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Environment::Test),
            "prod" => Ok(Environment::Prod),
            other => Err(GatewayError::Configuration {
                environment: other.to_string(),
                missing: "unknown environment (expected \"test\" or \"prod\")".to_string(),
            }),
        }
    }
}

/// One environment's service account credentials, in the field layout of the
/// Google service account JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountCredentials {
    /// Parses a credential set from a JSON blob, as stored in the
    /// environment variables the deployment supplies.
    pub fn from_json(json: &str) -> Result<Self, GatewayError> {
        serde_json::from_str(json).map_err(|e| GatewayError::Configuration {
            environment: "unknown".to_string(),
            missing: format!("invalid credential JSON: {e}"),
        })
    }

    /// Checks the three mandatory fields, reporting every missing one.
    pub fn validate(&self, environment: Environment) -> Result<(), GatewayError> {
        let mut missing = Vec::new();
        if self.project_id.is_empty() {
            missing.push("project_id");
        }
        if self.private_key.is_empty() {
            missing.push("private_key");
        }
        if self.client_email.is_empty() {
            missing.push("client_email");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Configuration {
                environment: environment.to_string(),
                missing: format!("missing fields: {}", missing.join(", ")),
            })
        }
    }
}

/// Process-lifetime gateway configuration. Read once at startup, never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub test_credentials: ServiceAccountCredentials,
    pub prod_credentials: ServiceAccountCredentials,
    /// OOB-code endpoint; overridable so tests can point it at a fake.
    pub oob_endpoint: String,
    /// Bounded timeout applied to every outbound HTTP call.
    pub http_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(
        test_credentials: ServiceAccountCredentials,
        prod_credentials: ServiceAccountCredentials,
    ) -> Self {
        Self {
            test_credentials,
            prod_credentials,
            oob_endpoint: DEFAULT_OOB_ENDPOINT.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Loads both credential sets from `FIREBASE_TEST_CREDENTIALS` and
    /// `FIREBASE_PROD_CREDENTIALS` (JSON blobs), with an optional timeout
    /// override in `GATEWAY_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, GatewayError> {
        let test = read_credentials_env("FIREBASE_TEST_CREDENTIALS", Environment::Test)?;
        let prod = read_credentials_env("FIREBASE_PROD_CREDENTIALS", Environment::Prod)?;

        let mut config = Self::new(test, prod);
        if let Ok(secs) = std::env::var("GATEWAY_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.http_timeout = Duration::from_secs(secs);
            }
        }
        Ok(config)
    }

    pub fn with_oob_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.oob_endpoint = endpoint.into();
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn credentials(&self, environment: Environment) -> &ServiceAccountCredentials {
        match environment {
            Environment::Test => &self.test_credentials,
            Environment::Prod => &self.prod_credentials,
        }
    }
}

fn read_credentials_env(
    var: &str,
    environment: Environment,
) -> Result<ServiceAccountCredentials, GatewayError> {
    let json = std::env::var(var).map_err(|_| GatewayError::Configuration {
        environment: environment.to_string(),
        missing: format!("{var} is not set"),
    })?;
    let mut credentials = ServiceAccountCredentials::from_json(&json)?;
    if credentials.token_uri.is_empty() {
        credentials.token_uri = DEFAULT_TOKEN_URI.to_string();
    }
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_round_trips_through_strings() {
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!(Environment::Prod.to_string(), "prod");
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn validate_reports_every_missing_field() {
        let credentials = ServiceAccountCredentials {
            project_id: String::new(),
            private_key: String::new(),
            client_email: "svc@test-project.iam.gserviceaccount.com".to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            private_key_id: None,
            client_id: None,
        };

        let err = credentials.validate(Environment::Prod).unwrap_err();
        match err {
            GatewayError::Configuration { environment, missing } => {
                assert_eq!(environment, "prod");
                assert_eq!(missing, "missing fields: project_id, private_key");
            }
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn from_json_applies_token_uri_default() {
        let credentials = ServiceAccountCredentials::from_json(
            r#"{"project_id": "p", "private_key": "k", "client_email": "e"}"#,
        )
        .unwrap();
        assert_eq!(credentials.token_uri, DEFAULT_TOKEN_URI);
        assert!(credentials.validate(Environment::Test).is_ok());
    }
}
