//! Integration tests for the request executor.
//!
//! These tests run the executor against a mock server and verify signing,
//! retry classification, backoff cancellation and response decoding.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use documentdb::clients::rest::CallOptions;
use documentdb::clients::{
    BackoffPolicy, CallContext, Executor, HttpError, HttpMethod, HttpRequest, ResponseEvent,
    RestClient,
};
use documentdb::models::{Database, Feed};
use documentdb::{DocumentDbConfig, DocumentDbConfigBuilder, Endpoint, MasterKey, Query};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, body_string, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A valid base64 master key ("test-master-key").
const KEY: &str = "dGVzdC1tYXN0ZXIta2V5";

fn builder(uri: &str) -> DocumentDbConfigBuilder {
    DocumentDbConfig::builder()
        .endpoint(Endpoint::new(uri).unwrap())
        .master_key(MasterKey::new(KEY).unwrap())
        .backoff(BackoffPolicy::new(8, 1, 2).unwrap())
}

fn executor(uri: &str) -> Executor {
    Executor::new(&builder(uri).build().unwrap()).unwrap()
}

fn create_database_request(id: &str) -> HttpRequest {
    HttpRequest::builder(HttpMethod::Post, "dbs")
        .body(serde_json::to_vec(&json!({ "id": id })).unwrap())
        .body_type(documentdb::clients::DataType::Json)
        .build()
        .unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

// ============================================================================
// Signing and headers
// ============================================================================

#[tokio::test]
async fn test_every_request_carries_signed_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dbs"))
        .and(header_exists("authorization"))
        .and(header_exists("x-ms-date"))
        .and(header("x-ms-version", "2018-12-31"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_rid": "",
            "Databases": [{"id": "a", "_self": "dbs/AAAA/"}],
            "_count": 1
        })))
        .mount(&server)
        .await;

    let request = HttpRequest::builder(HttpMethod::Get, "dbs").build().unwrap();
    let decoded = executor(&server.uri())
        .execute::<Feed<Database>>(request)
        .await
        .unwrap();

    assert_eq!(decoded.value.items.len(), 1);
    assert_eq!(decoded.value.items[0].resource.self_link(), "dbs/AAAA/");
    assert!(decoded.continuation.is_none());
}

#[tokio::test]
async fn test_query_sends_query_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dbs/abc/colls/"))
        .and(header("content-type", "application/query+json"))
        .and(header("x-ms-documentdb-isquery", "True"))
        .and(header("x-ms-continuation", "page-2"))
        .and(body_json(json!({
            "query": "SELECT * FROM ROOT r WHERE r.id = @id",
            "parameters": [{"name": "@id", "value": "orders"}]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ms-continuation", "page-3")
                .set_body_json(json!({"DocumentCollections": [], "_count": 0})),
        )
        .mount(&server)
        .await;

    let query = Query::by_id("orders").continuation("page-2");
    let request = HttpRequest::builder(HttpMethod::Post, "dbs/abc/colls/")
        .query(&query)
        .unwrap()
        .build()
        .unwrap();

    let decoded = executor(&server.uri())
        .execute::<Feed<Value>>(request)
        .await
        .unwrap();

    assert!(decoded.value.items.is_empty());
    assert_eq!(decoded.continuation.as_deref(), Some("page-3"));
}

#[tokio::test]
async fn test_empty_continuation_header_means_last_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dbs"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ms-continuation", "")
                .set_body_json(json!({"Databases": []})),
        )
        .mount(&server)
        .await;

    let request = HttpRequest::builder(HttpMethod::Get, "dbs").build().unwrap();
    let continuation = executor(&server.uri())
        .execute_discard(request)
        .await
        .unwrap();

    assert!(continuation.is_none());
}

#[tokio::test]
async fn test_malformed_master_key_fails_without_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = DocumentDbConfig::builder()
        .endpoint(Endpoint::new(server.uri()).unwrap())
        .master_key(MasterKey::new("not base64 at all!").unwrap())
        .build()
        .unwrap();
    let executor = Executor::new(&config).unwrap();

    let request = HttpRequest::builder(HttpMethod::Get, "dbs").build().unwrap();
    let result = executor.execute_discard(request).await;

    assert!(matches!(result, Err(HttpError::Auth(_))));
    assert_eq!(request_count(&server).await, 0);
}

// ============================================================================
// Retry classification
// ============================================================================

#[tokio::test]
async fn test_throttled_request_is_retried_with_identical_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dbs"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/dbs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "mydb",
            "_self": "dbs/XYZ=/",
            "_etag": "\"00001\""
        })))
        .mount(&server)
        .await;

    let decoded = executor(&server.uri())
        .execute::<Database>(create_database_request("mydb"))
        .await
        .unwrap();

    assert_eq!(decoded.value.resource.id, "mydb");
    assert_eq!(decoded.value.resource.etag(), "\"00001\"");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
    assert_eq!(
        serde_json::from_slice::<Value>(&requests[1].body).unwrap(),
        json!({"id": "mydb"})
    );
}

#[tokio::test]
async fn test_service_unavailable_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a"})))
        .mount(&server)
        .await;

    let request = HttpRequest::builder(HttpMethod::Get, "dbs/a/").build().unwrap();
    let decoded = executor(&server.uri())
        .execute::<Database>(request)
        .await
        .unwrap();

    assert_eq!(decoded.value.resource.id, "a");
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_sustained_unavailability_surfaces_last_error_after_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("x-ms-activity-id", "act-503")
                .set_body_json(json!({
                    "code": "ServiceUnavailable",
                    "message": "Service is currently unavailable."
                })),
        )
        .mount(&server)
        .await;

    let config = builder(&server.uri()).max_retries(2).build().unwrap();
    let request = HttpRequest::builder(HttpMethod::Get, "dbs").build().unwrap();
    let result = Executor::new(&config)
        .unwrap()
        .execute_discard(request)
        .await;

    match result {
        Err(HttpError::Request(e)) => {
            assert_eq!(e.status, 503);
            assert_eq!(e.code, "ServiceUnavailable");
            assert_eq!(e.message, "Service is currently unavailable.");
            assert_eq!(e.activity_id.as_deref(), Some("act-503"));
        }
        other => panic!("Expected RequestError, got {other:?}"),
    }
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_zero_max_retries_surfaces_first_throttle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "code": "429",
            "message": "Request rate is large"
        })))
        .mount(&server)
        .await;

    let config = builder(&server.uri()).max_retries(0).build().unwrap();
    let request = HttpRequest::builder(HttpMethod::Get, "dbs").build().unwrap();
    let result = Executor::new(&config)
        .unwrap()
        .execute_discard(request)
        .await;

    assert!(matches!(result, Err(HttpError::Request(e)) if e.status == 429));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_precondition_failed_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(412))
        .mount(&server)
        .await;

    let request = HttpRequest::builder(HttpMethod::Put, "dbs/a/colls/b/docs/c/")
        .body(b"{\"id\":\"c\"}".to_vec())
        .body_type(documentdb::clients::DataType::Json)
        .header("If-Match", "\"stale\"")
        .build()
        .unwrap();
    let result = executor(&server.uri()).execute::<Value>(request).await;

    assert!(matches!(result, Err(HttpError::PreconditionFailed)));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_conflict_is_a_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "Conflict",
            "message": "Resource with specified id or name already exists."
        })))
        .mount(&server)
        .await;

    let result = executor(&server.uri())
        .execute::<Database>(create_database_request("dup"))
        .await;

    let error = result.unwrap_err();
    assert!(error.is_conflict());
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_error_body_that_is_not_json_still_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let request = HttpRequest::builder(HttpMethod::Get, "dbs").build().unwrap();
    let result = executor(&server.uri()).execute_discard(request).await;

    match result {
        Err(HttpError::Request(e)) => {
            assert_eq!(e.status, 500);
            assert!(e.code.is_empty());
        }
        other => panic!("Expected RequestError, got {other:?}"),
    }
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_success_body_of_wrong_shape_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "a", "db"])))
        .mount(&server)
        .await;

    let request = HttpRequest::builder(HttpMethod::Get, "dbs/a/").build().unwrap();
    let result = executor(&server.uri()).execute::<Database>(request).await;

    assert!(matches!(result, Err(HttpError::Decode(_))));
}

#[tokio::test]
async fn test_transport_error_is_not_retried() {
    // Nothing listens on port 1.
    let request = HttpRequest::builder(HttpMethod::Get, "dbs").build().unwrap();
    let result = executor("http://127.0.0.1:1").execute_discard(request).await;

    assert!(matches!(result, Err(HttpError::Transport(_))));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancellation_during_backoff_stops_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let config = builder(&server.uri())
        .backoff(BackoffPolicy::new(8, 60_000, 60_001).unwrap())
        .build()
        .unwrap();
    let executor = Executor::new(&config).unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let request = HttpRequest::builder(HttpMethod::Get, "dbs")
        .cancellation(token)
        .build()
        .unwrap();
    let result = tokio::time::timeout(Duration::from_secs(10), executor.execute_discard(request))
        .await
        .expect("cancellation should end the backoff wait");

    assert!(matches!(result, Err(HttpError::Cancelled)));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_cancelled_token_does_not_abort_a_successful_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a"})))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    token.cancel();
    let request = HttpRequest::builder(HttpMethod::Get, "dbs/a/")
        .cancellation(token)
        .build()
        .unwrap();

    let decoded = executor(&server.uri())
        .execute::<Database>(request)
        .await
        .unwrap();
    assert_eq!(decoded.value.resource.id, "a");
}

async fn mount_throttle_then_success(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a"})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cancelled_token_ends_the_first_backoff_wait() {
    let server = MockServer::start().await;
    mount_throttle_then_success(&server).await;

    let token = CancellationToken::new();
    token.cancel();
    let request = HttpRequest::builder(HttpMethod::Get, "dbs/a/")
        .cancellation(token)
        .build()
        .unwrap();

    let result = executor(&server.uri()).execute_discard(request).await;

    assert!(matches!(result, Err(HttpError::Cancelled)));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_ignore_cancellation_keeps_retrying_through_cancelled_token() {
    let server = MockServer::start().await;
    mount_throttle_then_success(&server).await;

    let config = builder(&server.uri())
        .ignore_cancellation(true)
        .build()
        .unwrap();
    let token = CancellationToken::new();
    token.cancel();
    let request = HttpRequest::builder(HttpMethod::Get, "dbs/a/")
        .cancellation(token)
        .build()
        .unwrap();

    let decoded = Executor::new(&config)
        .unwrap()
        .execute::<Database>(request)
        .await
        .unwrap();

    assert_eq!(decoded.value.resource.id, "a");
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_debug_logging_does_not_change_retry_outcome() {
    let server = MockServer::start().await;
    mount_throttle_then_success(&server).await;

    let config = builder(&server.uri()).debug_logging(true).build().unwrap();
    let request = HttpRequest::builder(HttpMethod::Get, "dbs/a/").build().unwrap();

    let decoded = Executor::new(&config)
        .unwrap()
        .execute::<Database>(request)
        .await
        .unwrap();

    assert_eq!(decoded.value.resource.id, "a");
    assert_eq!(request_count(&server).await, 2);
}

// ============================================================================
// Raw bodies
// ============================================================================

#[tokio::test]
async fn test_pre_encoded_body_is_sent_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dbs/a/colls/b/sprocs/p"))
        .and(body_string(r#"["x",1]"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(2)))
        .mount(&server)
        .await;

    let client = RestClient::new(&builder(&server.uri()).build().unwrap()).unwrap();
    let result: u32 = client
        .send_raw(
            HttpMethod::Post,
            "dbs/a/colls/b/sprocs/p",
            r#"["x",1]"#,
            None,
            &CallOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result, 2);
    assert_eq!(request_count(&server).await, 1);
}

// ============================================================================
// Response hook
// ============================================================================

#[tokio::test]
async fn test_hook_sees_every_attempt_with_call_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("x-ms-request-charge", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ms-request-charge", "2.79")
                .set_body_json(json!({"Documents": []})),
        )
        .mount(&server)
        .await;

    let seen: Arc<Mutex<Vec<(u16, u32, Option<String>, Option<f64>)>>> =
        Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicU32::new(0));
    let (seen_hook, calls_hook) = (Arc::clone(&seen), Arc::clone(&calls));

    let config = builder(&server.uri())
        .response_hook(move |event: &ResponseEvent<'_>| {
            calls_hook.fetch_add(1, Ordering::SeqCst);
            assert_eq!(event.method, HttpMethod::Post);
            assert_eq!(event.link, "dbs/a/colls/orders/docs/");
            assert!(event.context.query.is_some());
            seen_hook.lock().unwrap().push((
                event.status,
                event.attempt,
                event.context.collection.clone(),
                event.request_charge(),
            ));
        })
        .build()
        .unwrap();

    let request = HttpRequest::builder(HttpMethod::Post, "dbs/a/colls/orders/docs/")
        .query(&Query::text("SELECT * FROM root"))
        .unwrap()
        .context(CallContext::for_collection("orders"))
        .build()
        .unwrap();
    Executor::new(&config)
        .unwrap()
        .execute::<Feed<Value>>(request)
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, 429);
    assert_eq!(seen[0].1, 0);
    assert_eq!(seen[1].0, 200);
    assert_eq!(seen[1].1, 1);
    assert_eq!(seen[1].2.as_deref(), Some("orders"));
    assert_eq!(seen[1].3, Some(2.79));
}

#[tokio::test]
async fn test_concurrent_calls_keep_independent_retry_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dbs/throttled/"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dbs/ok/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ok"})))
        .mount(&server)
        .await;

    let config = builder(&server.uri()).max_retries(3).build().unwrap();
    let executor = Arc::new(Executor::new(&config).unwrap());

    let throttled = {
        let executor = Arc::clone(&executor);
        tokio::spawn(async move {
            let request = HttpRequest::builder(HttpMethod::Get, "dbs/throttled/")
                .build()
                .unwrap();
            executor.execute_discard(request).await
        })
    };
    let ok = {
        let executor = Arc::clone(&executor);
        tokio::spawn(async move {
            let request = HttpRequest::builder(HttpMethod::Get, "dbs/ok/").build().unwrap();
            executor.execute::<Database>(request).await
        })
    };

    assert!(matches!(
        throttled.await.unwrap(),
        Err(HttpError::Request(e)) if e.status == 429
    ));
    assert_eq!(ok.await.unwrap().unwrap().value.resource.id, "ok");

    let requests = server.received_requests().await.unwrap();
    let throttled_count = requests
        .iter()
        .filter(|r| r.url.path() == "/dbs/throttled/")
        .count();
    assert_eq!(throttled_count, 4);
}
