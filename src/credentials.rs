//! Credential descriptors and the credential provider contract.
//!
//! A connector declares which named credential it needs and where the secret
//! goes on the wire. Secrets themselves live behind [`CredentialStore`]; only
//! [`crate::http::AuthenticatedClient`] ever reads them.

use std::collections::HashMap;
use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::AppConfig;
use crate::error::{ErrorKind, OperationError};
use crate::http::HttpMethod;

/// API key that is wiped from memory on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Resolved credentials for one credential type
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_key: ApiKey,
}

/// Where the API key is attached on outgoing requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPlacement {
    /// `Authorization: Bearer <key>`
    BearerHeader,
    /// `?<name>=<key>` on every request
    QueryParameter(&'static str),
}

/// Fixed request used to check a key at setup time
#[derive(Debug, Clone, Copy)]
pub struct CredentialTest {
    pub method: HttpMethod,
    pub path: &'static str,
}

/// Static description of the credential a connector consumes
#[derive(Debug, Clone, Copy)]
pub struct CredentialDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub documentation_url: &'static str,
    pub placement: AuthPlacement,
    pub test: CredentialTest,
}

/// Provider of secrets by credential name.
pub trait CredentialStore: Send + Sync {
    fn get_credentials(&self, name: &str) -> Result<ApiCredentials, OperationError>;
}

/// Credential store backed by an in-memory map
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    keys: HashMap<String, ApiKey>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key<N: Into<String>>(mut self, name: N, key: ApiKey) -> Self {
        self.insert(name, key);
        self
    }

    pub fn insert<N: Into<String>>(&mut self, name: N, key: ApiKey) {
        self.keys.insert(name.into(), key);
    }

    /// Build a store from the keys present in the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut store = Self::new();
        if let Some(key) = config.anymailfinder_api_key.as_deref().filter(|k| !k.is_empty()) {
            store.insert(
                crate::connectors::anymailfinder::CREDENTIAL.name,
                ApiKey::new(key),
            );
        }
        if let Some(key) = config.smartlead_api_key.as_deref().filter(|k| !k.is_empty()) {
            store.insert(
                crate::connectors::smartlead::CREDENTIAL.name,
                ApiKey::new(key),
            );
        }
        store
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get_credentials(&self, name: &str) -> Result<ApiCredentials, OperationError> {
        self.keys
            .get(name)
            .cloned()
            .map(|api_key| ApiCredentials { api_key })
            .ok_or_else(|| ErrorKind::MissingCredentials(name.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-live-123");
        assert_eq!(format!("{:?}", key), "ApiKey([REDACTED])");
        assert_eq!(key.expose(), "sk-live-123");
    }

    #[test]
    fn test_missing_credentials() {
        let store = InMemoryCredentialStore::new();
        let err = store.get_credentials("smartleadApi").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingCredentials(ref n) if n == "smartleadApi"));
    }

    #[test]
    fn test_store_from_config_skips_empty_keys() {
        let config = AppConfig {
            anymailfinder_api_key: Some("amf-key".to_string()),
            smartlead_api_key: Some(String::new()),
            ..AppConfig::default()
        };
        let store = InMemoryCredentialStore::from_config(&config);

        let creds = store.get_credentials("anymailFinderApi").unwrap();
        assert_eq!(creds.api_key.expose(), "amf-key");
        assert!(store.get_credentials("smartleadApi").is_err());
    }
}
