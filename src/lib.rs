#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(warnings)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_let_else)]
//! # Neighborly functions
//!
//! The two serverless functions behind the Neighborly classifieds app:
//!
//! - an HTTP-triggered **ingest handler** that stores an advertisement in a
//!   MongoDB collection and then announces it on an Event Grid topic;
//! - an event-triggered **observer** that logs every event the topic
//!   delivers to it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neighborly::{FunctionsConfig, IngestHandler};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handler = IngestHandler::from_config(FunctionsConfig::from_env());
//!
//! let response = handler
//!     .handle(br#"{"title":"Lawnmower","description":"Free to a good home","city":"Springfield"}"#)
//!     .await;
//!
//! println!("{} {}", response.status, response.body_text());
//! # }
//! ```
//!
//! ## Failure semantics
//!
//! - Empty or non-object bodies answer `400`.
//! - A missing connection string or unreachable store answers `500`.
//! - Publishing is best-effort: a missing topic setting or a failed publish
//!   is logged and the caller still gets `200` with its body echoed back.
//!
//! ## Features
//!
//! - `mongodb-store` (default): [`store::MongoStore`]
//! - `reqwest-transport` (default): [`publisher::EventGridPublisher`]
//! - `serverless-azure` (default): Azure Functions custom-handler adapter

use std::future::Future;
use std::pin::Pin;

pub mod advertisement;
pub mod config;
pub mod errors;
pub mod events;
pub mod ingest;
pub mod observer;
pub mod publisher;
pub mod store;
pub mod testing;

/// Serverless adapters for Azure Functions.
#[cfg(feature = "serverless-azure")]
#[cfg_attr(docsrs, doc(cfg(feature = "serverless-azure")))]
pub mod serverless;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use advertisement::Advertisement;
pub use config::{FunctionsConfig, TopicCredentials};
pub use errors::{NeighborlyError, Result, ServiceError};
pub use events::{AdvertisementCreated, CreationEvent, ObservedEvent};
pub use ingest::{HttpResponse, IngestHandler, IngestOutcome, PublishOutcome};
pub use observer::{EventObserver, EventSummary};
pub use publisher::{DynPublisher, EventPublisher};
pub use store::{DocumentStore, DynStore, InsertOneResult, StoreTarget};

/// A boxed future returned by the store and publisher traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
