//! In-memory fakes for the store and the event bus, with assertion helpers.
//!
//! # Usage
//!
//! ```rust
//! use neighborly::testing::{FakeDocumentStore, FakePublisher};
//! use neighborly::{FunctionsConfig, IngestHandler};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = FakeDocumentStore::new();
//! let publisher = FakePublisher::new();
//! let handler = IngestHandler::new(
//!     FunctionsConfig::new().store_url("mongodb://fake"),
//!     Arc::new(store.clone()),
//!     Arc::new(publisher.clone()),
//! );
//!
//! handler.handle(br#"{"title":"Desk"}"#).await;
//! store.assert_inserted_count(1);
//! publisher.refute_published();
//! # }
//! ```

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::config::TopicCredentials;
use crate::errors::NeighborlyError;
use crate::events::CreationEvent;
use crate::publisher::EventPublisher;
use crate::store::{DocumentStore, InsertOneResult, StoreTarget};
use crate::BoxFuture;

// ---------------------------------------------------------------------------
// FakeDocumentStore
// ---------------------------------------------------------------------------

/// A document recorded by [`FakeDocumentStore`].
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub url: String,
    pub database: String,
    pub collection: String,
    pub document: Map<String, Value>,
}

/// In-memory document store.
#[derive(Debug, Clone, Default)]
pub struct FakeDocumentStore {
    inner: Arc<Mutex<FakeStoreInner>>,
}

#[derive(Debug, Default)]
struct FakeStoreInner {
    inserted: Vec<StoredDocument>,
    unreachable: bool,
    next_id: u64,
}

impl FakeDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every insert fails with a connection error.
    pub fn unreachable() -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().unreachable = true;
        store
    }

    /// All documents inserted so far.
    pub fn inserted(&self) -> Vec<StoredDocument> {
        self.inner.lock().unwrap().inserted.clone()
    }

    /// Assert exactly `expected` documents were inserted.
    pub fn assert_inserted_count(&self, expected: usize) {
        let count = self.inner.lock().unwrap().inserted.len();
        assert_eq!(
            count, expected,
            "Expected {} inserted document(s), found {}",
            expected, count
        );
    }
}

impl DocumentStore for FakeDocumentStore {
    fn insert_one<'a>(
        &'a self,
        target: StoreTarget<'a>,
        document: Map<String, Value>,
    ) -> BoxFuture<'a, crate::Result<InsertOneResult>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            if inner.unreachable {
                return Err(NeighborlyError::StoreConnection(format!(
                    "no server reachable at {}",
                    target.url
                )));
            }

            inner.next_id += 1;
            let id = format!("{:024x}", inner.next_id);
            inner.inserted.push(StoredDocument {
                id: id.clone(),
                url: target.url.to_string(),
                database: target.database.to_string(),
                collection: target.collection.to_string(),
                document,
            });
            Ok(InsertOneResult { inserted_id: id })
        })
    }
}

// ---------------------------------------------------------------------------
// FakePublisher
// ---------------------------------------------------------------------------

/// An event recorded by [`FakePublisher`].
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub topic: TopicCredentials,
    pub event: CreationEvent,
}

/// In-memory event bus.
#[derive(Debug, Clone, Default)]
pub struct FakePublisher {
    inner: Arc<Mutex<FakePublisherInner>>,
}

#[derive(Debug, Default)]
struct FakePublisherInner {
    published: Vec<PublishedEvent>,
    attempts: usize,
    failure: Option<String>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose every call fails with the given transport error.
    pub fn failing(message: impl Into<String>) -> Self {
        let publisher = Self::new();
        publisher.inner.lock().unwrap().failure = Some(message.into());
        publisher
    }

    /// Events accepted so far.
    pub fn published(&self) -> Vec<PublishedEvent> {
        self.inner.lock().unwrap().published.clone()
    }

    /// Number of publish calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.inner.lock().unwrap().attempts
    }

    /// Assert at least one event of the given type was published.
    pub fn assert_published(&self, event_type: &str) {
        let inner = self.inner.lock().unwrap();
        assert!(
            inner.published.iter().any(|p| p.event.event_type == event_type),
            "Expected a published event of type '{}', found types: {:?}",
            event_type,
            inner
                .published
                .iter()
                .map(|p| &p.event.event_type)
                .collect::<Vec<_>>()
        );
    }

    /// Assert no publish call was made at all.
    pub fn refute_published(&self) {
        let attempts = self.attempts();
        assert_eq!(
            attempts, 0,
            "Expected no publish attempts, but found {}",
            attempts
        );
    }
}

impl EventPublisher for FakePublisher {
    fn publish<'a>(
        &'a self,
        topic: &'a TopicCredentials,
        events: &'a [CreationEvent],
    ) -> BoxFuture<'a, crate::Result<()>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner.attempts += 1;
            if let Some(message) = &inner.failure {
                return Err(NeighborlyError::Transport(message.clone()));
            }
            for event in events {
                inner.published.push(PublishedEvent {
                    topic: topic.clone(),
                    event: event.clone(),
                });
            }
            Ok(())
        })
    }
}
