//! Connector trait definition
//!
//! A connector is a declarative bundle: credential, base URL, field
//! descriptors and an operation catalog. The dispatcher in
//! [`crate::execution`] drives every connector the same way.

use url::Url;

use crate::connectors::catalog::{Catalog, OperationOption, RequestParts};
use crate::connectors::metadata::ConnectorMetadata;
use crate::credentials::CredentialDescriptor;
use crate::error::OperationError;
use crate::fields::{FieldDescriptor, FieldReader};

pub trait Connector: Send + Sync {
    /// Registry key, e.g. `smartlead`.
    fn name(&self) -> &'static str {
        self.metadata().name
    }

    fn metadata(&self) -> &ConnectorMetadata;

    /// Credential type consumed by every request of this connector.
    fn credential(&self) -> &'static CredentialDescriptor;

    fn base_url(&self) -> &Url;

    /// All input fields, including `resource` and `operation`.
    fn fields(&self) -> &'static [FieldDescriptor];

    fn catalog(&self) -> &Catalog;

    /// Headers sent on every request, including the credential test.
    fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
    }

    /// Connector-wide per-item request settings such as timeouts or extra
    /// headers. Values set by an operation builder take precedence.
    fn request_defaults(&self, _reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
        Ok(RequestParts::empty())
    }

    /// Operations offered for `resource`, used to populate the operation selector.
    fn load_operations(&self, resource: &str) -> Vec<OperationOption> {
        self.catalog().load_operations(resource)
    }
}
