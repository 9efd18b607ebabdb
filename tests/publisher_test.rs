use neighborly::publisher::EventGridPublisher;
use neighborly::testing::FakeDocumentStore;
use neighborly::{
    Advertisement, CreationEvent, EventPublisher, FunctionsConfig, IngestHandler,
    NeighborlyError, PublishOutcome, TopicCredentials,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn topic(server: &MockServer) -> TopicCredentials {
    TopicCredentials {
        endpoint: format!("{}/api/events", server.uri()),
        key: "sas-key-123".to_string(),
    }
}

fn sample_event() -> CreationEvent {
    let body = br#"{"title":"Canoe","description":"Two seats","city":"Duluth"}"#;
    let ad = Advertisement::parse(body).unwrap();
    CreationEvent::new("6650f1a2b3c4d5e6f7a8b9c0", &ad)
}

// ---------------------------------------------------------------------------
// EventGridPublisher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_publish_sends_event_grid_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/events"))
        .and(query_param("api-version", "2018-01-01"))
        .and(header("aeg-sas-key", "sas-key-123"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = EventGridPublisher::new();
    let event = sample_event();

    publisher
        .publish(&topic(&server), std::slice::from_ref(&event))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let sent = &body.as_array().unwrap()[0];

    assert_eq!(sent["id"], event.id);
    assert_eq!(sent["eventType"], "Neighborly.Advertisement.Created");
    assert_eq!(sent["subject"], "advertisement/created");
    assert_eq!(sent["dataVersion"], "1.0");
    assert_eq!(sent["data"]["id"], "6650f1a2b3c4d5e6f7a8b9c0");
    assert_eq!(sent["data"]["title"], "Canoe");
    assert_eq!(sent["data"]["description"], "Two seats");
    assert_eq!(sent["data"]["city"], "Duluth");
    assert!(sent["data"]["created_at"].is_string());
    assert!(sent["eventTime"].is_string());
}

#[tokio::test]
async fn test_publish_parses_structured_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": "Unauthorized",
                "message": "The request authorization key is not authorized"
            }
        })))
        .mount(&server)
        .await;

    let err = EventGridPublisher::new()
        .publish(&topic(&server), &[sample_event()])
        .await
        .unwrap_err();

    match err {
        NeighborlyError::Service(service) => {
            assert_eq!(service.code, "Unauthorized");
            assert_eq!(service.http_status, 401);
            assert!(service.is_unauthorized());
        }
        other => panic!("expected a service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_publish_plain_text_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = EventGridPublisher::new()
        .publish(&topic(&server), &[sample_event()])
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "[http_503] overloaded");
}

#[tokio::test]
async fn test_publish_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = EventGridPublisher::new()
        .timeout(Duration::from_millis(100))
        .publish(&topic(&server), &[sample_event()])
        .await
        .unwrap_err();

    assert!(matches!(err, NeighborlyError::Transport(_)), "{err:?}");
}

// ---------------------------------------------------------------------------
// Ingest against a real HTTP publisher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ingest_survives_rejected_publish() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let store = FakeDocumentStore::new();
    let config = FunctionsConfig::new()
        .store_url("mongodb://localhost:27017")
        .topic_endpoint(format!("{}/api/events", server.uri()))
        .topic_key("sas-key-123");
    let handler = IngestHandler::new(
        config,
        Arc::new(store.clone()),
        Arc::new(EventGridPublisher::new()),
    );

    let body = br#"{"title":"Canoe"}"#;
    let outcome = handler.ingest(body).await;

    assert_eq!(outcome.response.status, 200);
    assert_eq!(outcome.response.body, body.to_vec());
    assert!(matches!(outcome.publish, PublishOutcome::Failed(_)));
    store.assert_inserted_count(1);
}

#[tokio::test]
async fn test_ingest_survives_unreachable_topic() {
    let store = FakeDocumentStore::new();
    let config = FunctionsConfig::new()
        .store_url("mongodb://localhost:27017")
        // Port 9 (discard) on loopback: nothing listens there.
        .topic_endpoint("http://127.0.0.1:9/api/events")
        .topic_key("sas-key-123");
    let handler = IngestHandler::new(
        config,
        Arc::new(store.clone()),
        Arc::new(EventGridPublisher::new().timeout(Duration::from_secs(2))),
    );

    let outcome = handler.ingest(br#"{"title":"Canoe"}"#).await;

    assert_eq!(outcome.response.status, 200);
    assert!(matches!(outcome.publish, PublishOutcome::Failed(_)));
}
