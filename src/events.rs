//! Advertisement domain events.
//!
//! Events use the Event Grid envelope (`id`, `eventType`, `subject`,
//! `eventTime`, `dataVersion`, `data`). [`CreationEvent`] is what the ingest
//! handler publishes; [`ObservedEvent`] is the looser shape the observer
//! accepts from the bus, which may carry events of any type.
//!
//! # Example
//!
//! ```rust
//! use neighborly::ObservedEvent;
//!
//! let raw = r#"{
//!     "id": "e1",
//!     "topic": "/subscriptions/s/resourceGroups/g/providers/Microsoft.EventGrid/topics/ads",
//!     "subject": "advertisement/created",
//!     "eventType": "Neighborly.Advertisement.Created",
//!     "eventTime": "2025-01-01T00:00:00Z",
//!     "dataVersion": "1.0",
//!     "data": {"id": "abc"}
//! }"#;
//!
//! let event: ObservedEvent = serde_json::from_str(raw).unwrap();
//! assert_eq!(event.event_type, "Neighborly.Advertisement.Created");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::advertisement::Advertisement;

// ---------------------------------------------------------------------------
// Event constants
// ---------------------------------------------------------------------------

pub const EVENT_ADVERTISEMENT_CREATED: &str = "Neighborly.Advertisement.Created";
pub const SUBJECT_ADVERTISEMENT_CREATED: &str = "advertisement/created";
pub const DATA_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Outgoing creation event
// ---------------------------------------------------------------------------

/// Payload announcing a newly stored advertisement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvertisementCreated {
    /// Id assigned by the document store.
    pub id: String,
    pub title: String,
    pub description: String,
    pub city: String,
    /// UTC time the event was built.
    pub created_at: DateTime<Utc>,
}

/// Event published once per successful insert.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationEvent {
    /// Unique event identifier (UUIDv4).
    pub id: String,
    pub event_type: String,
    pub subject: String,
    pub event_time: DateTime<Utc>,
    pub data_version: String,
    pub data: AdvertisementCreated,
}

impl CreationEvent {
    /// Build the creation event for an advertisement the store accepted.
    pub fn new(advertisement_id: impl Into<String>, advertisement: &Advertisement) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type: EVENT_ADVERTISEMENT_CREATED.to_string(),
            subject: SUBJECT_ADVERTISEMENT_CREATED.to_string(),
            event_time: now,
            data_version: DATA_VERSION.to_string(),
            data: AdvertisementCreated {
                id: advertisement_id.into(),
                title: advertisement.title(),
                description: advertisement.description(),
                city: advertisement.city(),
                created_at: now,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Incoming event
// ---------------------------------------------------------------------------

/// An event pushed to the observer by the bus.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedEvent {
    pub id: String,

    /// Full resource path of the source topic.
    #[serde(default)]
    pub topic: String,

    #[serde(default)]
    pub subject: String,

    pub event_type: String,

    /// Event-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_version: Option<String>,
}

impl ObservedEvent {
    /// Create an event with no payload.
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        subject: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            subject: subject.into(),
            event_type: event_type.into(),
            data: None,
            data_version: None,
            event_time: None,
            metadata_version: None,
        }
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<CreationEvent> for ObservedEvent {
    fn from(event: CreationEvent) -> Self {
        Self {
            id: event.id,
            topic: String::new(),
            subject: event.subject,
            event_type: event.event_type,
            data: serde_json::to_value(&event.data).ok(),
            data_version: Some(event.data_version),
            event_time: Some(event.event_time),
            metadata_version: None,
        }
    }
}
