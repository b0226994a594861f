//! Connector metadata types

use serde::Serialize;

/// How a connector authenticates against its upstream API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// API key sent as a bearer token
    Bearer,
    /// API key sent as a query parameter
    ApiKeyQuery,
}

/// Descriptive information about a connector
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorMetadata {
    /// Registry key
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub auth_type: AuthType,
    /// Workflow category the host lists the connector under
    pub group: &'static str,
    pub version: u32,
}
