//! HTTP-triggered advertisement ingest.
//!
//! [`IngestHandler`] parses a request body, stores it and announces it on
//! the event bus. The store write decides the response; the announcement
//! never does.
//!
//! # Example
//!
//! ```rust,no_run
//! use neighborly::{FunctionsConfig, IngestHandler};
//!
//! # async fn run() {
//! let handler = IngestHandler::from_config(FunctionsConfig::from_env());
//! let response = handler
//!     .handle(br#"{"title":"Lawnmower","city":"Springfield"}"#)
//!     .await;
//! assert_eq!(response.status, 200);
//! # }
//! ```

use std::borrow::Cow;

use crate::advertisement::{Advertisement, COLLECTION_NAME, DATABASE_NAME};
use crate::config::{FunctionsConfig, ENV_STORE_URL};
use crate::errors::{NeighborlyError, MSG_MISSING_BODY, MSG_STORE_UNAVAILABLE};
use crate::events::CreationEvent;
use crate::publisher::DynPublisher;
use crate::store::{DynStore, StoreTarget};

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response returned to the HTTP caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn echo(body: &[u8]) -> Self {
        Self {
            status: 200,
            content_type: CONTENT_TYPE_JSON,
            body: body.to_vec(),
        }
    }

    fn text(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body: message.as_bytes().to_vec(),
        }
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What happened to the creation event of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The request never reached the publish step.
    NotAttempted,
    /// Topic endpoint or key is not configured.
    Skipped,
    /// The bus accepted the event.
    Published { event_id: String },
    /// Publishing failed; the reason was logged and swallowed.
    Failed(String),
}

/// Full result of one ingest invocation.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub response: HttpResponse,
    /// Id of the stored advertisement, if the insert succeeded.
    pub advertisement_id: Option<String>,
    pub publish: PublishOutcome,
}

impl IngestOutcome {
    fn rejected(response: HttpResponse) -> Self {
        Self {
            response,
            advertisement_id: None,
            publish: PublishOutcome::NotAttempted,
        }
    }
}

// ---------------------------------------------------------------------------
// IngestHandler
// ---------------------------------------------------------------------------

/// Stores advertisements and publishes their creation events.
///
/// `IngestHandler` holds no per-request state and is `Send + Sync`; share it
/// across concurrent invocations behind an `Arc`.
#[derive(Debug, Clone)]
pub struct IngestHandler {
    config: FunctionsConfig,
    store: DynStore,
    publisher: DynPublisher,
}

impl IngestHandler {
    /// Create a handler from explicit collaborators.
    pub fn new(config: FunctionsConfig, store: DynStore, publisher: DynPublisher) -> Self {
        Self {
            config,
            store,
            publisher,
        }
    }

    /// Create a handler backed by MongoDB and Event Grid.
    #[cfg(all(feature = "mongodb-store", feature = "reqwest-transport"))]
    pub fn from_config(config: FunctionsConfig) -> Self {
        let mut store = crate::store::MongoStore::new();
        if let Some(timeout) = config.store_timeout {
            store = store.server_selection_timeout(timeout);
        }

        let mut publisher = crate::publisher::EventGridPublisher::new();
        if let Some(timeout) = config.publish_timeout {
            publisher = publisher.timeout(timeout);
        }

        Self::new(config, std::sync::Arc::new(store), std::sync::Arc::new(publisher))
    }

    pub fn config(&self) -> &FunctionsConfig {
        &self.config
    }

    /// Handle a request body and return only the HTTP response.
    pub async fn handle(&self, body: &[u8]) -> HttpResponse {
        self.ingest(body).await.response
    }

    /// Handle a request body, reporting the store and publish results.
    pub async fn ingest(&self, body: &[u8]) -> IngestOutcome {
        let advertisement = match Advertisement::parse(body) {
            Ok(ad) => ad,
            Err(e) => {
                tracing::info!(error = %e, "rejecting advertisement request");
                return IngestOutcome::rejected(HttpResponse::text(
                    e.status_code(),
                    MSG_MISSING_BODY,
                ));
            }
        };

        let advertisement_id = match self.insert(advertisement.clone()).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "could not store advertisement");
                return IngestOutcome::rejected(HttpResponse::text(500, MSG_STORE_UNAVAILABLE));
            }
        };

        tracing::info!(advertisement.id = %advertisement_id, "advertisement stored");

        let publish = self.announce(&advertisement_id, &advertisement).await;

        IngestOutcome {
            response: HttpResponse::echo(body),
            advertisement_id: Some(advertisement_id),
            publish,
        }
    }

    async fn insert(&self, advertisement: Advertisement) -> crate::Result<String> {
        let url = self.config.store_url.as_deref().ok_or_else(|| {
            NeighborlyError::StoreConnection(format!("{} is not set", ENV_STORE_URL))
        })?;

        let target = StoreTarget {
            url,
            database: DATABASE_NAME,
            collection: COLLECTION_NAME,
        };

        let result = self
            .store
            .insert_one(target, advertisement.into_fields())
            .await?;
        Ok(result.inserted_id)
    }

    async fn announce(
        &self,
        advertisement_id: &str,
        advertisement: &Advertisement,
    ) -> PublishOutcome {
        let topic = match self.config.topic() {
            Some(topic) => topic,
            None => {
                tracing::warn!(
                    advertisement.id = %advertisement_id,
                    "event grid credentials not configured, creation event not published"
                );
                return PublishOutcome::Skipped;
            }
        };

        let event = CreationEvent::new(advertisement_id, advertisement);
        let event_id = event.id.clone();

        match self
            .publisher
            .publish(&topic, std::slice::from_ref(&event))
            .await
        {
            Ok(()) => {
                tracing::info!(
                    advertisement.id = %advertisement_id,
                    event.id = %event_id,
                    "creation event published"
                );
                PublishOutcome::Published { event_id }
            }
            Err(e) => {
                tracing::error!(
                    advertisement.id = %advertisement_id,
                    event.id = %event_id,
                    error = %e,
                    "failed to publish creation event"
                );
                PublishOutcome::Failed(e.to_string())
            }
        }
    }
}
