use std::sync::Arc;

use outreach_connectors::connectors::{AnymailFinderConnector, anymailfinder};
use outreach_connectors::credentials::{ApiKey, InMemoryCredentialStore};
use outreach_connectors::error::ErrorKind;
use outreach_connectors::execution::{Dispatcher, ExecutionOptions, ItemParameters};
use outreach_connectors::http::{AuthenticatedClient, ReqwestTransport};
use serde_json::{Map, Value, json};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

fn client() -> AuthenticatedClient {
    let store = InMemoryCredentialStore::new()
        .with_key(anymailfinder::CREDENTIAL.name, ApiKey::new("amf-test-key"));
    AuthenticatedClient::new(Arc::new(ReqwestTransport::default()), Arc::new(store))
}

fn connector(server: &MockServer) -> AnymailFinderConnector {
    AnymailFinderConnector::new(Url::parse(&server.uri()).unwrap())
}

fn batch(parameters: Value) -> ItemParameters {
    let parameters: Map<String, Value> = parameters.as_object().cloned().unwrap();
    ItemParameters::single(parameters)
}

#[tokio::test]
async fn test_person_email_lookup_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v5.0/search/person.json"))
        .and(header("authorization", "Bearer amf-test-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"full_name": "John Doe", "domain": "microsoft.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "results": {"email": "john.doe@microsoft.com", "validation": "valid"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(Arc::new(connector(&server)), client());
    let records = dispatcher
        .execute(
            &batch(json!({
                "resource": "personEmail",
                "operation": "findEmail",
                "fullName": "John Doe",
                "domain": "microsoft.com",
            })),
            ExecutionOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].json["results"]["email"],
        json!("john.doe@microsoft.com")
    );
}

#[tokio::test]
async fn test_webhook_url_is_sent_as_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v5.1/verify-email"))
        .and(header("x-webhook-url", "https://hooks.example.com/amf"))
        .and(body_json(json!({"email": "ada@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(Arc::new(connector(&server)), client());
    let records = dispatcher
        .execute(
            &batch(json!({
                "resource": "emailVerification",
                "operation": "verifyEmail",
                "email": "ada@example.com",
                "additionalOptions": {"webhookUrl": "https://hooks.example.com/amf"},
            })),
            ExecutionOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(records[0].json, json!({"status": "queued"}));
}

#[tokio::test]
async fn test_upstream_error_is_truncated() {
    let server = MockServer::start().await;
    let long_body = "x".repeat(500);

    Mock::given(method("GET"))
        .and(path("/v5.1/account"))
        .respond_with(ResponseTemplate::new(402).set_body_string(long_body))
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(Arc::new(connector(&server)), client());
    let err = dispatcher
        .execute(
            &batch(json!({"resource": "accountInfo", "operation": "getInfo"})),
            ExecutionOptions::default(),
        )
        .await
        .unwrap_err();

    match err.kind {
        ErrorKind::Http { status, ref body } => {
            assert_eq!(status, 402);
            assert_eq!(body.len(), 203);
            assert!(body.ends_with("..."));
        }
        ref other => panic!("expected HTTP error, got {other:?}"),
    }
    assert_eq!(err.item_index, Some(0));
}

#[tokio::test]
async fn test_credential_test_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v5.0/meta/account.json"))
        .and(header("authorization", "Bearer amf-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"credits": 10})))
        .expect(1)
        .mount(&server)
        .await;

    client().test_credentials(&connector(&server)).await.unwrap();
}

#[tokio::test]
async fn test_missing_credentials() {
    let server = MockServer::start().await;
    let dispatcher = Dispatcher::new(
        Arc::new(connector(&server)),
        AuthenticatedClient::new(
            Arc::new(ReqwestTransport::default()),
            Arc::new(InMemoryCredentialStore::new()),
        ),
    );

    let err = dispatcher
        .execute(
            &batch(json!({"resource": "accountInfo", "operation": "getInfo"})),
            ExecutionOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::MissingCredentials(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
