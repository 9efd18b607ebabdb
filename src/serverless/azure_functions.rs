//! Azure Functions custom-handler adapter.
//!
//! Handles two invocation shapes sent by the Functions host:
//!
//! - **HTTP trigger** (`createAdvertisement`): the request arrives in the
//!   `req` input binding; the response is written to the `res` output
//!   binding.
//!
//! - **Event Grid trigger** (`eventGridTrigger`): the event arrives in the
//!   `event` input binding; there is no output.
//!
//! Each [`InvokeResponse`] carries a `Logs` array that the host forwards to
//! its own log stream, next to whatever `tracing` records.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::errors::NeighborlyError;
use crate::events::ObservedEvent;
use crate::ingest::{IngestHandler, PublishOutcome};
use crate::observer::{EventObserver, EventSummary};

pub const FUNCTION_CREATE_ADVERTISEMENT: &str = "createAdvertisement";
pub const FUNCTION_EVENT_GRID_TRIGGER: &str = "eventGridTrigger";

const BINDING_HTTP_REQUEST: &str = "req";
const BINDING_HTTP_RESPONSE: &str = "res";
const BINDING_EVENT: &str = "event";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Invocation payload posted by the Functions host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Input bindings keyed by binding name.
    #[serde(rename = "Data", default)]
    pub data: Map<String, Value>,

    /// Trigger metadata.
    #[serde(rename = "Metadata", default)]
    pub metadata: Map<String, Value>,
}

/// Reply returned to the Functions host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// Output bindings keyed by binding name.
    #[serde(rename = "Outputs", default)]
    pub outputs: Map<String, Value>,

    /// Lines the host appends to the invocation log.
    #[serde(rename = "Logs", default)]
    pub logs: Vec<String>,

    #[serde(rename = "ReturnValue", default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<Value>,
}

/// The `req` binding of an HTTP-triggered invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpRequestBinding {
    #[serde(rename = "Url", default)]
    pub url: String,

    #[serde(rename = "Method", default)]
    pub method: String,

    #[serde(rename = "Headers", default)]
    pub headers: HashMap<String, Vec<String>>,

    #[serde(rename = "Query", default)]
    pub query: HashMap<String, String>,

    /// Raw body. The host sends a string; a pre-parsed JSON value is
    /// re-serialized.
    #[serde(rename = "Body", default)]
    pub body: Option<Value>,
}

impl HttpRequestBinding {
    fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(s)) => s.as_bytes().to_vec(),
            Some(other) => other.to_string().into_bytes(),
        }
    }
}

// ---------------------------------------------------------------------------
// CustomHandler
// ---------------------------------------------------------------------------

/// Routes custom-handler invocations to the Neighborly functions.
///
/// `CustomHandler` is `Send + Sync`; share it across requests behind an
/// `Arc`.
#[derive(Debug, Clone)]
pub struct CustomHandler {
    ingest: IngestHandler,
    observer: EventObserver,
}

impl CustomHandler {
    pub fn new(ingest: IngestHandler) -> Self {
        Self {
            ingest,
            observer: EventObserver::new(),
        }
    }

    /// Route an invocation by function name.
    pub async fn dispatch(
        &self,
        function_name: &str,
        request: InvokeRequest,
    ) -> Result<InvokeResponse, NeighborlyError> {
        match function_name {
            FUNCTION_CREATE_ADVERTISEMENT => self.handle_http(request).await,
            FUNCTION_EVENT_GRID_TRIGGER => self.handle_event_grid(request),
            other => Err(NeighborlyError::UnknownFunction(other.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // HTTP trigger
    // ------------------------------------------------------------------

    /// Run the ingest handler for an HTTP-triggered invocation.
    ///
    /// Only a malformed invocation payload is an `Err`; every ingest outcome,
    /// including 400 and 500, is written to the `res` binding.
    pub async fn handle_http(
        &self,
        request: InvokeRequest,
    ) -> Result<InvokeResponse, NeighborlyError> {
        let binding = request
            .data
            .get(BINDING_HTTP_REQUEST)
            .cloned()
            .ok_or_else(|| missing_binding(BINDING_HTTP_REQUEST))?;
        let http: HttpRequestBinding = serde_json::from_value(binding)?;

        let outcome = self.ingest.ingest(&http.body_bytes()).await;
        let response = &outcome.response;

        let mut logs = Vec::new();
        match &outcome.publish {
            PublishOutcome::Skipped => {
                logs.push("Event Grid credentials not configured".to_string());
            }
            PublishOutcome::Failed(reason) => {
                logs.push(format!("Failed to publish event to Event Grid: {}", reason));
            }
            PublishOutcome::Published { .. } => {
                if let Some(id) = &outcome.advertisement_id {
                    logs.push(format!(
                        "Event published to Event Grid for advertisement {}",
                        id
                    ));
                }
            }
            PublishOutcome::NotAttempted => {}
        }

        let mut outputs = Map::new();
        outputs.insert(
            BINDING_HTTP_RESPONSE.to_string(),
            json!({
                "statusCode": response.status,
                "body": response.body_text(),
                "headers": { "Content-Type": response.content_type },
            }),
        );

        Ok(InvokeResponse {
            outputs,
            logs,
            return_value: None,
        })
    }

    /// Parse a raw invocation body and run [`handle_http`](Self::handle_http).
    pub async fn handle_http_raw(&self, body: &str) -> Result<InvokeResponse, NeighborlyError> {
        let request: InvokeRequest = serde_json::from_str(body)?;
        self.handle_http(request).await
    }

    // ------------------------------------------------------------------
    // Event Grid trigger
    // ------------------------------------------------------------------

    /// Run the observer for an Event Grid-triggered invocation.
    pub fn handle_event_grid(
        &self,
        request: InvokeRequest,
    ) -> Result<InvokeResponse, NeighborlyError> {
        let binding = request
            .data
            .get(BINDING_EVENT)
            .ok_or_else(|| missing_binding(BINDING_EVENT))?;

        // Some host versions deliver the event as a JSON string.
        let event: ObservedEvent = match binding {
            Value::String(raw) => serde_json::from_str(raw)?,
            other => serde_json::from_value(other.clone())?,
        };

        self.observer.observe(&event);

        let mut logs = vec![format!(
            "Processed an event: {}",
            EventSummary::of(&event).to_log_line()
        )];
        if let Some(data) = &event.data {
            logs.push(format!("Event Data: {}", data));
        }

        Ok(InvokeResponse {
            outputs: Map::new(),
            logs,
            return_value: None,
        })
    }

    /// Parse a raw invocation body and run [`handle_event_grid`](Self::handle_event_grid).
    pub fn handle_event_grid_raw(&self, body: &str) -> Result<InvokeResponse, NeighborlyError> {
        let request: InvokeRequest = serde_json::from_str(body)?;
        self.handle_event_grid(request)
    }
}

fn missing_binding(name: &str) -> NeighborlyError {
    NeighborlyError::Config(format!("invocation has no '{}' binding", name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDocumentStore, FakePublisher};
    use crate::FunctionsConfig;
    use std::sync::Arc;

    fn custom_handler(config: FunctionsConfig) -> (CustomHandler, FakePublisher) {
        let publisher = FakePublisher::new();
        let ingest = IngestHandler::new(
            config,
            Arc::new(FakeDocumentStore::new()),
            Arc::new(publisher.clone()),
        );
        (CustomHandler::new(ingest), publisher)
    }

    fn http_invocation(body: Value) -> InvokeRequest {
        let mut data = Map::new();
        data.insert(
            "req".to_string(),
            json!({
                "Url": "http://localhost:7071/api/createAdvertisement",
                "Method": "POST",
                "Headers": {"Content-Type": ["application/json"]},
                "Query": {},
                "Body": body,
            }),
        );
        InvokeRequest {
            data,
            metadata: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_http_invocation_echoes_body() {
        let (handler, _) = custom_handler(FunctionsConfig::new().store_url("mongodb://fake"));
        let body = r#"{"title":"Kayak","city":"Oslo"}"#;

        let resp = handler
            .dispatch(FUNCTION_CREATE_ADVERTISEMENT, http_invocation(json!(body)))
            .await
            .unwrap();

        let res = &resp.outputs["res"];
        assert_eq!(res["statusCode"], 200);
        assert_eq!(res["body"], body);
        assert_eq!(resp.logs, vec!["Event Grid credentials not configured"]);
    }

    #[tokio::test]
    async fn test_http_invocation_without_body_is_400() {
        let config = FunctionsConfig::new().store_url("mongodb://fake");
        let (handler, publisher) = custom_handler(config);

        let resp = handler.handle_http(http_invocation(Value::Null)).await.unwrap();

        assert_eq!(resp.outputs["res"]["statusCode"], 400);
        publisher.refute_published();
    }

    #[tokio::test]
    async fn test_http_invocation_reports_publish() {
        let config = FunctionsConfig::new()
            .store_url("mongodb://fake")
            .topic_endpoint("https://topic.example/api/events")
            .topic_key("k");
        let (handler, publisher) = custom_handler(config);

        let resp = handler
            .handle_http(http_invocation(json!(r#"{"title":"Tent"}"#)))
            .await
            .unwrap();

        assert_eq!(resp.outputs["res"]["statusCode"], 200);
        assert!(resp.logs[0].starts_with("Event published to Event Grid for advertisement"));
        assert_eq!(publisher.published().len(), 1);
    }

    #[tokio::test]
    async fn test_http_invocation_logs_failed_publish() {
        let config = FunctionsConfig::new()
            .store_url("mongodb://fake")
            .topic_endpoint("https://topic.example/api/events")
            .topic_key("k");
        let publisher = FakePublisher::failing("topic unavailable");
        let ingest = IngestHandler::new(
            config,
            Arc::new(FakeDocumentStore::new()),
            Arc::new(publisher.clone()),
        );
        let handler = CustomHandler::new(ingest);

        let resp = handler
            .handle_http(http_invocation(json!(r#"{"title":"Tent"}"#)))
            .await
            .unwrap();

        assert_eq!(resp.outputs["res"]["statusCode"], 200);
        assert!(
            resp.logs[0].starts_with("Failed to publish event to Event Grid: "),
            "{:?}",
            resp.logs
        );
        assert!(resp.logs[0].contains("topic unavailable"));
        assert_eq!(publisher.attempts(), 1);
    }

    #[tokio::test]
    async fn test_missing_binding_is_error() {
        let (handler, _) = custom_handler(FunctionsConfig::new());
        let err = handler.handle_http(InvokeRequest::default()).await.unwrap_err();
        assert!(err.to_string().contains("'req'"));
    }

    #[test]
    fn test_event_grid_invocation_accepts_string_event() {
        let (handler, _) = custom_handler(FunctionsConfig::new());
        let event = json!({
            "id": "e1",
            "topic": "t",
            "subject": "advertisement/created",
            "eventType": "Neighborly.Advertisement.Created",
            "data": {"id": "abc"}
        });
        let mut data = Map::new();
        data.insert("event".to_string(), Value::String(event.to_string()));

        let resp = handler
            .handle_event_grid(InvokeRequest {
                data,
                metadata: Map::new(),
            })
            .unwrap();

        assert!(resp.outputs.is_empty());
        assert_eq!(resp.logs.len(), 2);
        assert!(resp.logs[0].contains("\"id\":\"e1\""));
        assert_eq!(resp.logs[1], r#"Event Data: {"id":"abc"}"#);
    }

    #[tokio::test]
    async fn test_unknown_function() {
        let (handler, _) = custom_handler(FunctionsConfig::new());
        let err = handler
            .dispatch("deleteAdvertisement", InvokeRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, NeighborlyError::UnknownFunction(_)));
    }
}
