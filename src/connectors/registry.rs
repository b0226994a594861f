//! Connector registry
//!
//! In-memory lookup of connectors and their metadata by registry key.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::config::AppConfig;
use crate::connectors::{AnymailFinderConnector, Connector, ConnectorMetadata, SmartleadConnector};

/// Error type for registry operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("Connector '{name}' not found")]
    ConnectorNotFound { name: String },
    #[error("Invalid base URL '{url}' for connector '{name}': {reason}")]
    InvalidBaseUrl {
        name: String,
        url: String,
        reason: String,
    },
}

/// Registry of connectors keyed by name
#[derive(Clone, Default)]
pub struct Registry {
    connectors: HashMap<&'static str, Arc<dyn Connector>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding both connectors, pointed at the configured base URLs.
    pub fn from_config(config: &AppConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        let anymailfinder_url = parse_base_url("anymailFinder", &config.anymailfinder_base_url)?;
        let smartlead_url = parse_base_url("smartlead", &config.smartlead_base_url)?;

        crate::connectors::anymailfinder::register_anymailfinder_connector(
            &mut registry,
            Arc::new(AnymailFinderConnector::new(anymailfinder_url)),
        );
        crate::connectors::smartlead::register_smartlead_connector(
            &mut registry,
            Arc::new(SmartleadConnector::new(smartlead_url)),
        );
        Ok(registry)
    }

    pub fn register(&mut self, connector: Arc<dyn Connector>) {
        let name = connector.name();
        debug!(connector = name, "Registering connector");
        self.connectors.insert(name, connector);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Connector>, RegistryError> {
        self.connectors
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ConnectorNotFound {
                name: name.to_string(),
            })
    }

    /// Metadata for all connectors, sorted by name for stable ordering
    pub fn list_metadata(&self) -> Vec<ConnectorMetadata> {
        let mut metadata: Vec<_> = self
            .connectors
            .values()
            .map(|c| c.metadata().clone())
            .collect();
        metadata.sort_by(|a, b| a.name.cmp(b.name));
        metadata
    }
}

fn parse_base_url(name: &str, raw: &str) -> Result<Url, RegistryError> {
    Url::parse(raw).map_err(|e| RegistryError::InvalidBaseUrl {
        name: name.to_string(),
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_unknown_connector() {
        let registry = Registry::new();
        match registry.get("hubspot") {
            Err(RegistryError::ConnectorNotFound { name }) => assert_eq!(name, "hubspot"),
            _ => panic!("Expected ConnectorNotFound error"),
        }
    }

    #[test]
    fn test_registry_from_default_config() {
        let registry = Registry::from_config(&AppConfig::default()).unwrap();
        let names: Vec<_> = registry.list_metadata().iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["anymailFinder", "smartlead"]);

        let smartlead = registry.get("smartlead").unwrap();
        assert_eq!(
            smartlead.base_url().as_str(),
            "https://server.smartlead.ai/api/v1"
        );
    }

    #[test]
    fn test_registry_rejects_bad_base_url() {
        let config = AppConfig {
            smartlead_base_url: "not a url".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            Registry::from_config(&config),
            Err(RegistryError::InvalidBaseUrl { .. })
        ));
    }
}
