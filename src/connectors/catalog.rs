//! Operation catalog
//!
//! Each connector exposes a static table of [`OperationDescriptor`]s keyed by
//! resource and operation. A descriptor carries everything needed to turn one
//! item's parameters into a request: verb, path template, required fields and
//! a body/query builder.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::error::OperationError;
use crate::fields::{FieldAccess, FieldReader};
use crate::http::{HttpMethod, build_url};

/// Boolean field switching a structured body to raw JSON input
pub const JSON_PARAMETERS: &str = "jsonParameters";
/// Raw JSON body used when [`JSON_PARAMETERS`] is on
pub const BODY_JSON: &str = "bodyJson";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(\w+)\}").unwrap_or_else(|e| panic!("invalid placeholder pattern: {e}"))
});

/// Builds the query and body of an operation from one item's parameters.
pub type BuildFn = fn(&FieldReader<'_>) -> Result<RequestParts, OperationError>;

/// At least one of `fields` must be non-empty
#[derive(Debug, Clone, Copy)]
pub struct OneOf {
    pub fields: &'static [&'static str],
    pub message: &'static str,
}

/// Resource entry shown in the resource selector
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceDescriptor {
    pub name: &'static str,
    pub value: &'static str,
}

/// Entry returned by the operation loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOption {
    pub name: String,
    pub value: String,
    pub description: String,
}

/// Static description of one operation
#[derive(Clone, Copy)]
pub struct OperationDescriptor {
    pub resource: &'static str,
    pub operation: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub method: HttpMethod,
    /// Path relative to the connector base URL; `{field}` placeholders are
    /// filled from the item's parameters
    pub path: &'static str,
    pub required_fields: &'static [&'static str],
    pub one_of: Option<OneOf>,
    pub build: BuildFn,
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("resource", &self.resource)
            .field("operation", &self.operation)
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl OperationDescriptor {
    /// Field names referenced by the path template, in order.
    pub fn path_parameters(&self) -> Vec<&'static str> {
        PLACEHOLDER
            .captures_iter(self.path)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// Fields that must be non-empty before the request is built.
    pub fn required_parameters(&self) -> Vec<&'static str> {
        let mut names = self.path_parameters();
        for name in self.required_fields {
            if !names.contains(name) {
                names.push(name);
            }
        }
        names
    }

    /// Check required fields and the one-of constraint against an item.
    pub fn check_preconditions(&self, reader: &FieldReader<'_>) -> Result<(), OperationError> {
        if let Some(missing) = self
            .required_parameters()
            .into_iter()
            .find(|name| !reader.is_present(name))
        {
            return Err(OperationError::missing_parameter(missing));
        }
        if let Some(one_of) = &self.one_of {
            if !one_of.fields.iter().any(|name| reader.is_present(name)) {
                return Err(OperationError::validation(one_of.message));
            }
        }
        Ok(())
    }

    /// Resolve the path template against `base`, percent-encoding values.
    pub fn render_url(&self, base: &Url, reader: &FieldReader<'_>) -> Result<Url, OperationError> {
        let mut segments = Vec::new();
        for segment in self.path.trim_start_matches('/').split('/') {
            let mut rendered = String::with_capacity(segment.len());
            let mut last = 0;
            for capture in PLACEHOLDER.captures_iter(segment) {
                let (Some(whole), Some(name)) = (capture.get(0), capture.get(1)) else {
                    continue;
                };
                rendered.push_str(&segment[last..whole.start()]);
                rendered.push_str(&reader.required_string(name.as_str())?);
                last = whole.end();
            }
            rendered.push_str(&segment[last..]);
            segments.push(rendered);
        }
        build_url(base, segments)
    }
}

/// Query, body and per-request overrides produced by a builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParts {
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestParts {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_body(body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn query<V: ToString>(mut self, name: &str, value: V) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn query_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }
}

/// Sparse JSON object builder; absent values are left out entirely
#[derive(Debug, Clone, Default)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: Into<Value>>(&mut self, key: &str, value: V) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn set_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Use the raw `bodyJson` object when `jsonParameters` is on, otherwise build
/// the body from structured fields.
pub fn json_or_fields<F>(reader: &FieldReader<'_>, build: F) -> Result<Value, OperationError>
where
    F: FnOnce(&FieldReader<'_>) -> Result<Value, OperationError>,
{
    if !reader.boolean(JSON_PARAMETERS)?.unwrap_or(false) {
        return build(reader);
    }
    let body = reader.required_json(BODY_JSON)?;
    if !body.is_object() {
        return Err(OperationError::invalid_parameter(
            BODY_JSON,
            "must be a JSON object",
        ));
    }
    Ok(body)
}

/// Operations of a connector indexed by resource
pub struct Catalog {
    resources: &'static [ResourceDescriptor],
    by_resource: HashMap<&'static str, Vec<&'static OperationDescriptor>>,
}

impl Catalog {
    pub fn new(
        resources: &'static [ResourceDescriptor],
        operations: &'static [OperationDescriptor],
    ) -> Self {
        let mut by_resource: HashMap<&'static str, Vec<&'static OperationDescriptor>> =
            HashMap::new();
        for descriptor in operations {
            by_resource
                .entry(descriptor.resource)
                .or_default()
                .push(descriptor);
        }
        Self {
            resources,
            by_resource,
        }
    }

    pub fn resources(&self) -> &'static [ResourceDescriptor] {
        self.resources
    }

    pub fn operations(&self, resource: &str) -> &[&'static OperationDescriptor] {
        self.by_resource
            .get(resource)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn find(&self, resource: &str, operation: &str) -> Option<&'static OperationDescriptor> {
        self.operations(resource)
            .iter()
            .copied()
            .find(|d| d.operation == operation)
    }

    /// Like [`Catalog::find`], but an unknown pair is an error.
    pub fn resolve(
        &self,
        resource: &str,
        operation: &str,
    ) -> Result<&'static OperationDescriptor, OperationError> {
        self.find(resource, operation)
            .ok_or_else(|| OperationError::unsupported(resource, operation))
    }

    /// Operation choices for `resource`, in catalog order. Unknown resources yield nothing.
    pub fn load_operations(&self, resource: &str) -> Vec<OperationOption> {
        self.operations(resource)
            .iter()
            .map(|d| OperationOption {
                name: d.name.to_string(),
                value: d.operation.to_string(),
                description: d.description.to_string(),
            })
            .collect()
    }
}
