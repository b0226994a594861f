//! # Error Handling
//!
//! Every failure that can happen while a connector processes one pipeline item
//! is surfaced as a single [`OperationError`]: a typed [`ErrorKind`] plus the
//! index of the item it originated from. The batch loop decides whether the
//! error becomes an `{error: message}` record or aborts the whole run.

use serde_json::json;
use thiserror::Error;

/// Maximum number of characters of an upstream body kept in an error.
const BODY_SNIPPET_CHARS: usize = 200;

/// Error categories raised while building or sending a request
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A precondition on the item's parameters was not met
    #[error("{0}")]
    Validation(String),

    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("Parameter '{name}' is invalid: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A JSON-typed field did not contain valid JSON
    #[error("Parameter '{field}' must be valid JSON: {source}")]
    InvalidJson {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("The operation '{operation}' is not supported for resource '{resource}'")]
    UnsupportedOperation { resource: String, operation: String },

    #[error("No credentials configured for '{0}'")]
    MissingCredentials(String),

    /// Non-2xx response from the upstream API
    #[error("Request failed with status code {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// An error raised while processing a single pipeline item
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct OperationError {
    #[source]
    pub kind: ErrorKind,
    /// Index of the input item that produced the error, if known
    pub item_index: Option<usize>,
}

impl OperationError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            item_index: None,
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Validation(message.into()))
    }

    pub fn missing_parameter<S: Into<String>>(name: S) -> Self {
        Self::new(ErrorKind::MissingParameter(name.into()))
    }

    pub fn invalid_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::new(ErrorKind::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        })
    }

    pub fn invalid_json<S: Into<String>>(field: S, source: serde_json::Error) -> Self {
        Self::new(ErrorKind::InvalidJson {
            field: field.into(),
            source,
        })
    }

    pub fn unsupported<R: Into<String>, O: Into<String>>(resource: R, operation: O) -> Self {
        Self::new(ErrorKind::UnsupportedOperation {
            resource: resource.into(),
            operation: operation.into(),
        })
    }

    /// Build an upstream HTTP error, truncating the body to a short snippet.
    pub fn http(status: u16, body: Option<String>) -> Self {
        let body = body
            .filter(|b| !b.is_empty())
            .map(|b| {
                if b.chars().count() > BODY_SNIPPET_CHARS {
                    let truncated: String = b.chars().take(BODY_SNIPPET_CHARS).collect();
                    format!("{}...", truncated)
                } else {
                    b
                }
            })
            .unwrap_or_else(|| "No body".to_string());
        Self::new(ErrorKind::Http { status, body })
    }

    /// Attach the item index unless the error already carries one.
    pub fn with_item_index(mut self, index: usize) -> Self {
        if self.item_index.is_none() {
            self.item_index = Some(index);
        }
        self
    }

    /// Whether the error was raised before any request was sent.
    pub fn is_pre_request(&self) -> bool {
        !matches!(
            self.kind,
            ErrorKind::Http { .. } | ErrorKind::Network(_) | ErrorKind::MalformedResponse(_)
        )
    }

    /// JSON payload recorded in place of a result in continue-on-fail mode.
    pub fn to_error_json(&self) -> serde_json::Value {
        json!({ "error": self.to_string() })
    }
}

impl From<ErrorKind> for OperationError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<reqwest::Error> for OperationError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return Self::http(status.as_u16(), Some(error.to_string()));
        }
        Self::new(ErrorKind::Network(error.to_string()))
    }
}
