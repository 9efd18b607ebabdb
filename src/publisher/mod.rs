#[cfg(feature = "reqwest-transport")]
pub(crate) mod http;

#[cfg(feature = "reqwest-transport")]
pub use self::http::EventGridPublisher;

use std::fmt::Debug;
use std::sync::Arc;

use crate::config::TopicCredentials;
use crate::events::CreationEvent;
use crate::BoxFuture;

/// An event bus that creation events are published to.
///
/// This trait is object-safe and uses boxed futures for async support.
/// The default implementation posts to an Event Grid topic with reqwest
/// (enabled via the `reqwest-transport` feature). Credentials are passed on
/// every call so one publisher can serve any topic.
///
/// Callers treat publishing as best-effort: an `Err` here is logged, never
/// surfaced to the HTTP client.
pub trait EventPublisher: Send + Sync + Debug {
    /// Send a batch of events to the topic.
    fn publish<'a>(
        &'a self,
        topic: &'a TopicCredentials,
        events: &'a [CreationEvent],
    ) -> BoxFuture<'a, crate::Result<()>>;
}

/// A cloneable, type-erased publisher handle.
pub type DynPublisher = Arc<dyn EventPublisher>;
