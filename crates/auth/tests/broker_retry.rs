//! Identity broker retry contract tests.
//!
//! The broker call is the only retried operation in the adapter: five
//! attempts with a fixed delay, cancellable during the inter-attempt wait.

use std::time::{Duration, Instant};

use kvmount_auth::{AuthError, BrokerClient};
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DELAY: Duration = Duration::from_millis(50);

fn broker_for(server: &MockServer) -> BrokerClient {
    let endpoint = Url::parse(&format!("{}/host/token/", server.uri())).unwrap();
    BrokerClient::with_endpoint(reqwest::Client::new(), endpoint).with_retry(5, DELAY)
}

fn token_body() -> serde_json::Value {
    serde_json::json!({
        "token": { "access_token": "broker-token-0123456789", "expires_on": "1700000000" },
        "clientid": "client-id-0123456789"
    })
}

#[tokio::test]
async fn succeeds_on_fifth_attempt_after_four_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/host/token/"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(4)
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/host/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let started = Instant::now();
    let response = broker_for(&server)
        .fetch_token("https://vault.azure.net", "pod", "ns", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.client_id, "client-id-0123456789");
    assert_eq!(response.token.expires_on, Some(1_700_000_000));
    // Four failed attempts means four full inter-attempt waits.
    assert!(started.elapsed() >= DELAY * 4, "waited {:?}", started.elapsed());
}

#[tokio::test]
async fn fails_after_exactly_five_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/host/token/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&server)
        .await;

    let err = broker_for(&server)
        .fetch_token("https://vault.azure.net", "pod", "ns", &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        AuthError::BrokerExhausted { attempts, last } => {
            assert_eq!(attempts, 5);
            assert!(last.contains("500"), "last outcome was {last}");
        }
        other => panic!("expected BrokerExhausted, got {other}"),
    }
}

#[tokio::test]
async fn cancellation_during_wait_returns_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/host/token/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let endpoint = Url::parse(&format!("{}/host/token/", server.uri())).unwrap();
    let broker = BrokerClient::with_endpoint(reqwest::Client::new(), endpoint)
        .with_retry(5, Duration::from_secs(30));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = broker
        .fetch_token("https://vault.azure.net", "pod", "ns", &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Cancelled));
    // Must unblock well before the 30 s inter-attempt delay elapses.
    assert!(started.elapsed() < Duration::from_secs(5), "took {:?}", started.elapsed());
}

#[tokio::test]
async fn sends_pod_headers_and_resource_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/host/token/"))
        .and(query_param("resource", "https://vault.azure.net"))
        .and(header("podname", "nginx-flex-kv-0"))
        .and(header("podns", "default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    broker_for(&server)
        .fetch_token(
            "https://vault.azure.net",
            "nginx-flex-kv-0",
            "default",
            &CancellationToken::new(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn unusable_success_body_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/host/token/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "token": { "access_token": "" }, "clientid": "" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = broker_for(&server)
        .fetch_token("https://vault.azure.net", "pod", "ns", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MalformedToken { .. }));
}
