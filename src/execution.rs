//! Batch execution
//!
//! [`Dispatcher`] turns each input item into exactly one upstream request,
//! strictly in order, and collects one [`ResultRecord`] per item. With
//! continue-on-fail a failing item yields an `{error}` record; otherwise the
//! first failure aborts the batch.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::connectors::{Connector, OperationDescriptor};
use crate::error::{ErrorKind, OperationError};
use crate::fields::{FieldAccess, FieldReader, ParameterSource};
use crate::http::{AuthenticatedClient, RequestEnvelope};
use crate::telemetry;

/// Parameters of a batch: values shared by all items plus per-item overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemParameters {
    pub parameters: Map<String, Value>,
    pub items: Vec<Map<String, Value>>,
}

impl ItemParameters {
    pub fn new(parameters: Map<String, Value>, items: Vec<Map<String, Value>>) -> Self {
        Self { parameters, items }
    }

    /// A batch of one item that reads only the shared parameters.
    pub fn single(parameters: Map<String, Value>) -> Self {
        Self::new(parameters, vec![Map::new()])
    }

    /// Give an item-less batch one empty item so it runs once on the shared
    /// parameters.
    pub fn or_single_item(mut self) -> Self {
        if self.items.is_empty() {
            self.items.push(Map::new());
        }
        self
    }

    /// Number of items to process
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl ParameterSource for ItemParameters {
    fn parameter(&self, name: &str, item_index: usize) -> Option<&Value> {
        self.items
            .get(item_index)
            .and_then(|item| item.get(name))
            .or_else(|| self.parameters.get(name))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionOptions {
    pub continue_on_fail: bool,
}

/// Index of the input item a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// One output record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub json: Value,
    #[serde(rename = "pairedItem")]
    pub paired_item: PairedItem,
}

impl ResultRecord {
    pub fn new(json: Value, item: usize) -> Self {
        Self {
            json,
            paired_item: PairedItem { item },
        }
    }
}

/// A request ready to be sent, with the descriptor it was built from
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub descriptor: &'static OperationDescriptor,
    pub envelope: RequestEnvelope,
}

/// Normalize a decoded response body: `null` becomes `{}` and a JSON document
/// delivered as a string is parsed once more.
pub fn normalize_response(body: Value) -> Result<Value, OperationError> {
    match body {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::String(text) => serde_json::from_str(&text).map_err(|e| {
            ErrorKind::MalformedResponse(format!("response is not valid JSON: {}", e)).into()
        }),
        other => Ok(other),
    }
}

/// Drives one connector over a batch of items
#[derive(Clone)]
pub struct Dispatcher {
    connector: Arc<dyn Connector>,
    client: AuthenticatedClient,
}

impl Dispatcher {
    pub fn new(connector: Arc<dyn Connector>, client: AuthenticatedClient) -> Self {
        Self { connector, client }
    }

    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }

    /// Resolve the operation of item `index` and build its request.
    /// Nothing is sent; every validation error surfaces here.
    pub fn build_request(
        &self,
        params: &dyn ParameterSource,
        index: usize,
    ) -> Result<PreparedRequest, OperationError> {
        let connector = self.connector.as_ref();
        let reader = FieldReader::new(params, connector.fields(), index);

        let resource = reader.required_string("resource")?;
        let operation = reader.required_string("operation")?;
        let descriptor = connector.catalog().resolve(&resource, &operation)?;

        descriptor.check_preconditions(&reader)?;
        let parts = (descriptor.build)(&reader)?;
        let defaults = connector.request_defaults(&reader)?;

        let url = descriptor.render_url(connector.base_url(), &reader)?;
        let mut envelope = RequestEnvelope::new(descriptor.method, url);
        envelope.headers = connector.default_headers();
        envelope.headers.extend(defaults.headers);
        envelope.headers.extend(parts.headers);
        envelope.query = parts.query;
        envelope.body = parts.body;
        envelope.timeout = parts.timeout.or(defaults.timeout);

        debug!(
            connector = connector.name(),
            resource = %resource,
            operation = %operation,
            method = descriptor.method.as_str(),
            path = envelope.url.path(),
            "Built request"
        );

        Ok(PreparedRequest {
            descriptor,
            envelope,
        })
    }

    /// Build, send and normalize the request of a single item.
    #[instrument(skip(self, params), fields(connector = self.connector.name()))]
    pub async fn execute_item(
        &self,
        params: &dyn ParameterSource,
        index: usize,
    ) -> Result<Value, OperationError> {
        let prepared = self.build_request(params, index)?;
        let labels = vec![
            ("connector", self.connector.name().to_string()),
            ("resource", prepared.descriptor.resource.to_string()),
            ("operation", prepared.descriptor.operation.to_string()),
        ];
        counter!("connector_requests_total", &labels).increment(1);

        let started = Instant::now();
        let response = self
            .client
            .request_with_authentication(self.connector.credential(), prepared.envelope)
            .await;
        histogram!("connector_request_latency_ms", &labels)
            .record(started.elapsed().as_secs_f64() * 1_000.0);

        normalize_response(response?)
    }

    /// Process every item in order.
    ///
    /// Returns one record per item. Without continue-on-fail the first error
    /// is returned, tagged with its item index. An unsupported operation
    /// always aborts the batch.
    pub async fn execute(
        &self,
        params: &ItemParameters,
        options: ExecutionOptions,
    ) -> Result<Vec<ResultRecord>, OperationError> {
        let run_id = telemetry::current_run_id()
            .unwrap_or_else(|| telemetry::RunContext::generate().run_id);
        let span = info_span!(
            "connector_run",
            run_id = %run_id,
            connector = self.connector.name(),
            items = params.item_count()
        );

        async move {
            let mut records = Vec::with_capacity(params.item_count());
            for index in 0..params.item_count() {
                match self.execute_item(params, index).await {
                    Ok(json) => records.push(ResultRecord::new(json, index)),
                    Err(err) => {
                        counter!(
                            "connector_item_failures_total",
                            "connector" => self.connector.name()
                        )
                        .increment(1);
                        let unsupported = matches!(err.kind, ErrorKind::UnsupportedOperation { .. });
                        if unsupported || !options.continue_on_fail {
                            return Err(err.with_item_index(index));
                        }
                        warn!(
                            item = index,
                            error = %err,
                            request_sent = !err.is_pre_request(),
                            "Item failed, continuing"
                        );
                        records.push(ResultRecord::new(err.to_error_json(), index));
                    }
                }
            }
            info!(records = records.len(), "Run finished");
            Ok(records)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::{AnymailFinderConnector, SmartleadConnector, anymailfinder, smartlead};
    use crate::credentials::{ApiKey, InMemoryCredentialStore};
    use crate::http::{HttpMethod, Transport};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use url::Url;

    /// Records every request and answers with a fixed body
    struct RecordingTransport {
        requests: Mutex<Vec<RequestEnvelope>>,
        response: Value,
    }

    impl RecordingTransport {
        fn new(response: Value) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response,
            })
        }

        fn requests(&self) -> Vec<RequestEnvelope> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: RequestEnvelope) -> Result<Value, OperationError> {
            self.requests.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn client(transport: Arc<RecordingTransport>) -> AuthenticatedClient {
        let store = InMemoryCredentialStore::new()
            .with_key(anymailfinder::CREDENTIAL.name, ApiKey::new("amf-key"))
            .with_key(smartlead::CREDENTIAL.name, ApiKey::new("sl-key"));
        AuthenticatedClient::new(transport, Arc::new(store))
    }

    fn anymailfinder_dispatcher(transport: Arc<RecordingTransport>) -> Dispatcher {
        let connector = AnymailFinderConnector::new(
            Url::parse(anymailfinder::DEFAULT_BASE_URL).unwrap(),
        );
        Dispatcher::new(Arc::new(connector), client(transport))
    }

    fn smartlead_dispatcher(transport: Arc<RecordingTransport>) -> Dispatcher {
        let connector = SmartleadConnector::new(Url::parse(smartlead::DEFAULT_BASE_URL).unwrap());
        Dispatcher::new(Arc::new(connector), client(transport))
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn batch(parameters: Value, items: Vec<Value>) -> ItemParameters {
        ItemParameters::new(object(parameters), items.into_iter().map(object).collect())
    }

    #[tokio::test]
    async fn test_person_email_body_is_sparse() {
        let transport = RecordingTransport::new(json!({"email": "john@microsoft.com"}));
        let dispatcher = anymailfinder_dispatcher(transport.clone());
        let params = batch(
            json!({"resource": "personEmail", "operation": "findEmail"}),
            vec![json!({"fullName": "John Doe", "domain": "microsoft.com"})],
        );

        let records = dispatcher
            .execute(&params, ExecutionOptions::default())
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(
            requests[0].body,
            Some(json!({"full_name": "John Doe", "domain": "microsoft.com"}))
        );
        assert_eq!(requests[0].header("Authorization"), Some("Bearer amf-key"));
        assert_eq!(records[0].json, json!({"email": "john@microsoft.com"}));
    }

    #[tokio::test]
    async fn test_missing_domain_and_company_fails_without_request() {
        let transport = RecordingTransport::new(json!({}));
        let dispatcher = anymailfinder_dispatcher(transport.clone());
        for resource in ["personEmail", "companyEmail", "decisionMaker"] {
            let operation = if resource == "companyEmail" {
                "findEmails"
            } else {
                "findEmail"
            };
            let params = batch(
                json!({"resource": resource, "operation": operation, "fullName": "John Doe"}),
                vec![json!({})],
            );
            let err = dispatcher
                .execute(&params, ExecutionOptions::default())
                .await
                .unwrap_err();
            assert!(matches!(err.kind, ErrorKind::Validation(_)), "{resource}");
            assert_eq!(err.item_index, Some(0));
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_field_fails_before_request() {
        let transport = RecordingTransport::new(json!({}));
        let dispatcher = smartlead_dispatcher(transport.clone());
        let params = batch(
            json!({
                "resource": "lead",
                "operation": "addToCampaign",
                "campaignId": 7,
                "leadList": "[{\"email\": ",
            }),
            vec![json!({})],
        );
        let err = dispatcher
            .execute(&params, ExecutionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidJson { ref field, .. } if field == "leadList"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_response_round_trips_at_item_index() {
        let transport = RecordingTransport::new(json!({"status": "ok"}));
        let dispatcher = smartlead_dispatcher(transport);
        let params = batch(
            json!({"resource": "campaign", "operation": "get"}),
            vec![json!({"campaignId": 1}), json!({"campaignId": 2})],
        );
        let records = dispatcher
            .execute(&params, ExecutionOptions::default())
            .await
            .unwrap();
        assert_eq!(
            records,
            vec![
                ResultRecord::new(json!({"status": "ok"}), 0),
                ResultRecord::new(json!({"status": "ok"}), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_continue_on_fail_preserves_order() {
        let transport = RecordingTransport::new(json!({"status": "ok"}));
        let dispatcher = smartlead_dispatcher(transport.clone());
        let params = batch(
            json!({"resource": "campaign", "operation": "updateStatus", "campaignId": 9}),
            vec![
                json!({"status": "PAUSED"}),
                json!({"status": ""}),
                json!({"status": "START"}),
            ],
        );
        let records = dispatcher
            .execute(
                &params,
                ExecutionOptions {
                    continue_on_fail: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].json, json!({"status": "ok"}));
        assert_eq!(
            records[1].json,
            json!({"error": "Missing required parameter 'status'"})
        );
        assert_eq!(records[1].paired_item.item, 1);
        assert_eq!(records[2].json, json!({"status": "ok"}));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_abort_tags_failing_item() {
        let transport = RecordingTransport::new(json!({"status": "ok"}));
        let dispatcher = smartlead_dispatcher(transport.clone());
        let params = batch(
            json!({"resource": "campaign", "operation": "updateStatus", "campaignId": 9}),
            vec![json!({"status": "PAUSED"}), json!({"status": "ARCHIVED"})],
        );
        let err = dispatcher
            .execute(&params, ExecutionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.item_index, Some(1));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_campaign_status_update_request() {
        let transport = RecordingTransport::new(json!({"ok": true}));
        let dispatcher = smartlead_dispatcher(transport.clone());
        let params = batch(
            json!({
                "resource": "campaign",
                "operation": "updateStatus",
                "campaignId": 1234,
                "status": "PAUSED",
            }),
            vec![json!({})],
        );
        dispatcher
            .execute(&params, ExecutionOptions::default())
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(
            requests[0].url.as_str(),
            "https://server.smartlead.ai/api/v1/campaigns/1234/status"
        );
        assert_eq!(requests[0].body, Some(json!({"status": "PAUSED"})));
        assert_eq!(
            requests[0].query,
            vec![("api_key".to_string(), "sl-key".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unknown_operation_is_an_error() {
        let transport = RecordingTransport::new(json!({}));
        let dispatcher = smartlead_dispatcher(transport.clone());
        let params = batch(json!({"resource": "campaign", "operation": "archive"}), vec![json!({})]);
        let err = dispatcher
            .execute(&params, ExecutionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnsupportedOperation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_operation_aborts_with_continue_on_fail() {
        let transport = RecordingTransport::new(json!({"status": "ok"}));
        let dispatcher = smartlead_dispatcher(transport.clone());
        let params = batch(
            json!({"resource": "campaign", "campaignId": 3}),
            vec![
                json!({"operation": "get"}),
                json!({"operation": "archive"}),
                json!({"operation": "get"}),
            ],
        );
        let err = dispatcher
            .execute(
                &params,
                ExecutionOptions {
                    continue_on_fail: true,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnsupportedOperation { .. }));
        assert_eq!(err.item_index, Some(1));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let transport = RecordingTransport::new(json!({"status": "ok"}));
        let dispatcher = smartlead_dispatcher(transport.clone());
        let params = batch(json!({"resource": "campaign", "operation": "getAll"}), vec![]);
        let records = dispatcher
            .execute(&params, ExecutionOptions::default())
            .await
            .unwrap();
        assert!(records.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_missing_path_parameter() {
        let transport = RecordingTransport::new(json!({}));
        let dispatcher = smartlead_dispatcher(transport);
        let params = ItemParameters::single(object(
            json!({"resource": "lead", "operation": "getCampaigns"}),
        ));
        let err = dispatcher.build_request(&params, 0).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingParameter(ref n) if n == "leadId"));
    }

    #[test]
    fn test_item_values_override_shared_parameters() {
        let params = batch(
            json!({"resource": "campaign", "campaignId": 1}),
            vec![json!({}), json!({"campaignId": 2})],
        );
        assert_eq!(params.parameter("campaignId", 0), Some(&json!(1)));
        assert_eq!(params.parameter("campaignId", 1), Some(&json!(2)));
        assert_eq!(params.parameter("campaignId", 5), Some(&json!(1)));
        assert_eq!(params.item_count(), 2);
        assert_eq!(ItemParameters::default().item_count(), 0);
        assert_eq!(ItemParameters::default().or_single_item().item_count(), 1);
        assert_eq!(params.or_single_item().item_count(), 2);
    }

    #[test]
    fn test_normalize_response() {
        assert_eq!(normalize_response(Value::Null).unwrap(), json!({}));
        assert_eq!(
            normalize_response(json!("{\"id\": 5}")).unwrap(),
            json!({"id": 5})
        );
        assert_eq!(normalize_response(json!([1, 2])).unwrap(), json!([1, 2]));
        let err = normalize_response(json!("<html>")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedResponse(_)));
    }

    #[test]
    fn test_result_record_serialization() {
        let record = ResultRecord::new(json!({"id": 1}), 3);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"json": {"id": 1}, "pairedItem": {"item": 3}})
        );
    }
}
