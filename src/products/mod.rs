//! Product records: each product maps to one Firebase tenant per
//! environment and carries the display name used for email branding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::core::GatewayError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Stable machine name, unique within the catalog.
    pub name: String,
    /// Branding name used in email subjects and bodies.
    pub display_name: String,
    pub test_tenant_id: String,
    pub prod_tenant_id: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Tenant id for the given environment. Opaque; trusted as supplied.
    pub fn tenant_id(&self, environment: Environment) -> &str {
        match environment {
            Environment::Test => &self.test_tenant_id,
            Environment::Prod => &self.prod_tenant_id,
        }
    }
}

/// In-memory product catalog keyed by machine name.
#[derive(Debug, Default)]
pub struct ProductCatalog {
    products: HashMap<String, Product>,
}

impl ProductCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
        }
    }

    /// Loads the catalog from a JSON array of product records.
    pub fn from_json(json: &str) -> Result<Self, GatewayError> {
        let products: Vec<Product> =
            serde_json::from_str(json).map_err(|e| GatewayError::Configuration {
                environment: "catalog".to_string(),
                missing: format!("invalid product catalog JSON: {e}"),
            })?;
        Ok(Self::new(products))
    }

    /// Looks up an active product; inactive or unknown names are rejected.
    pub fn get(&self, name: &str) -> Result<&Product, GatewayError> {
        self.products
            .get(name)
            .filter(|p| p.is_active)
            .ok_or_else(|| GatewayError::UnknownProduct(name.to_string()))
    }

    pub fn upsert(&mut self, product: Product) {
        self.products.insert(product.name.clone(), product);
    }

    pub fn remove(&mut self, name: &str) -> Option<Product> {
        self.products.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Product {
        Product {
            name: "ehr".to_string(),
            display_name: "EHR".to_string(),
            test_tenant_id: "ehr-test".to_string(),
            prod_tenant_id: "ehr-prod".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn tenant_id_follows_environment() {
        let product = sample();
        assert_eq!(product.tenant_id(Environment::Test), "ehr-test");
        assert_eq!(product.tenant_id(Environment::Prod), "ehr-prod");
    }

    #[test]
    fn unknown_and_inactive_products_are_rejected() {
        let mut inactive = sample();
        inactive.is_active = false;
        let catalog = ProductCatalog::new([inactive]);

        assert!(matches!(
            catalog.get("ehr"),
            Err(GatewayError::UnknownProduct(_))
        ));
        assert!(matches!(
            catalog.get("nope"),
            Err(GatewayError::UnknownProduct(_))
        ));
    }

    #[test]
    fn catalog_loads_from_json() {
        let catalog = ProductCatalog::from_json(
            r#"[{
                "name": "beta_health",
                "display_name": "Beta Health",
                "test_tenant_id": "bh-test",
                "prod_tenant_id": "bh-prod"
            }]"#,
        )
        .unwrap();

        let product = catalog.get("beta_health").unwrap();
        assert!(product.is_active);
        assert_eq!(product.tenant_id(Environment::Prod), "bh-prod");
    }
}
