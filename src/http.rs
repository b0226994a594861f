//! HTTP plumbing shared by all connectors.
//!
//! The dispatcher produces a [`RequestEnvelope`]; [`AuthenticatedClient`]
//! attaches the connector's secret and hands the envelope to a [`Transport`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::connectors::Connector;
use crate::credentials::{ApiKey, AuthPlacement, CredentialDescriptor, CredentialStore};
use crate::error::OperationError;

/// HTTP verb of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully resolved outbound request, built fresh for every item
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

impl RequestEnvelope {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter value by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Append path segments to a base URL, percent-encoding each segment.
pub fn build_url<I, S>(base: &Url, segments: I) -> Result<Url, OperationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            OperationError::invalid_parameter("baseUrl", format!("'{}' cannot be a base", base))
        })?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

/// Decode a response body: empty bodies become `null`, anything that is not
/// JSON is kept as a string.
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Sends a request envelope and returns the decoded response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestEnvelope) -> Result<Value, OperationError>;
}

/// [`Transport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    default_timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new(default_timeout: Option<Duration>) -> Self {
        Self {
            client: reqwest::Client::new(),
            default_timeout,
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestEnvelope) -> Result<Value, OperationError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone());

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout.or(self.default_timeout) {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(
            method = request.method.as_str(),
            path = request.url.path(),
            status = status.as_u16(),
            "Upstream response received"
        );

        if !status.is_success() {
            return Err(OperationError::http(status.as_u16(), Some(text)));
        }

        Ok(decode_body(&text))
    }
}

/// Attach the API key to a request according to the credential's placement.
fn authenticate(request: &mut RequestEnvelope, placement: AuthPlacement, key: &ApiKey) {
    match placement {
        AuthPlacement::BearerHeader => {
            request.headers.retain(|(k, _)| !k.eq_ignore_ascii_case("authorization"));
            request
                .headers
                .push(("Authorization".to_string(), format!("Bearer {}", key.expose())));
        }
        AuthPlacement::QueryParameter(name) => {
            request.query.retain(|(k, _)| k != name);
            request
                .query
                .push((name.to_string(), key.expose().to_string()));
        }
    }
}

/// Issues requests on behalf of connectors, injecting their secrets.
#[derive(Clone)]
pub struct AuthenticatedClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthenticatedClient {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Resolve the named credential, authenticate the request and send it.
    pub async fn request_with_authentication(
        &self,
        credential: &CredentialDescriptor,
        mut request: RequestEnvelope,
    ) -> Result<Value, OperationError> {
        let credentials = self.credentials.get_credentials(credential.name)?;
        authenticate(&mut request, credential.placement, &credentials.api_key);
        self.transport.send(request).await
    }

    /// Run the connector's fixed credential test request. Any 2xx passes.
    pub async fn test_credentials(&self, connector: &dyn Connector) -> Result<(), OperationError> {
        let credential = connector.credential();
        let url = build_url(
            connector.base_url(),
            credential.test.path.trim_start_matches('/').split('/'),
        )?;
        let mut request = RequestEnvelope::new(credential.test.method, url);
        request.headers = connector.default_headers();

        self.request_with_authentication(credential, request)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_url_appends_and_encodes_segments() {
        let base = Url::parse("https://server.smartlead.ai/api/v1").unwrap();
        let url = build_url(&base, ["campaigns", "12 34", "status"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://server.smartlead.ai/api/v1/campaigns/12%2034/status"
        );
    }

    #[test]
    fn test_build_url_keeps_trailing_slash() {
        let base = Url::parse("https://server.smartlead.ai/api/v1/").unwrap();
        let url = build_url(&base, ["email-accounts", ""]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://server.smartlead.ai/api/v1/email-accounts/"
        );
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("{\"ok\":true}"), json!({"ok": true}));
        assert_eq!(decode_body("plain text"), json!("plain text"));
        assert_eq!(
            decode_body("\"{\\\"a\\\":1}\""),
            Value::String("{\"a\":1}".to_string())
        );
    }

    #[test]
    fn test_authenticate_bearer_replaces_existing_header() {
        let mut request = RequestEnvelope::new(
            HttpMethod::Get,
            Url::parse("https://api.anymailfinder.com/v5.1/account").unwrap(),
        );
        request
            .headers
            .push(("authorization".to_string(), "Bearer stale".to_string()));

        authenticate(&mut request, AuthPlacement::BearerHeader, &ApiKey::new("fresh"));

        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("Authorization"), Some("Bearer fresh"));
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_authenticate_query_parameter() {
        let mut request = RequestEnvelope::new(
            HttpMethod::Get,
            Url::parse("https://server.smartlead.ai/api/v1/campaigns").unwrap(),
        );
        request.query.push(("limit".to_string(), "10".to_string()));

        authenticate(
            &mut request,
            AuthPlacement::QueryParameter("api_key"),
            &ApiKey::new("sl-key"),
        );

        assert_eq!(request.query_param("api_key"), Some("sl-key"));
        assert_eq!(request.query_param("limit"), Some("10"));
        assert!(request.header("Authorization").is_none());
    }
}
