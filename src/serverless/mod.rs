//! Serverless adapters for running the Neighborly functions on a FaaS host.
//!
//! # Feature Flag
//!
//! This module is only available when the `serverless-azure` feature is
//! enabled (it is on by default):
//!
//! ```toml
//! [dependencies]
//! neighborly-functions = { version = "0.1", features = ["serverless-azure"] }
//! ```
//!
//! # Azure Functions custom handlers
//!
//! The Functions host forwards every invocation to a custom handler process
//! as a JSON POST to `/{function_name}`. [`CustomHandler`] turns those
//! payloads into calls on [`IngestHandler`](crate::IngestHandler) and
//! [`EventObserver`](crate::EventObserver). Wire it into whatever HTTP
//! server the deployment already uses:
//!
//! ```rust,ignore
//! use neighborly::serverless::{CustomHandler, InvokeRequest};
//! use neighborly::{FunctionsConfig, IngestHandler};
//!
//! let handler = CustomHandler::new(IngestHandler::from_config(FunctionsConfig::from_env()));
//!
//! // inside the POST /{function_name} route:
//! let response = handler.dispatch(&function_name, request).await?;
//! ```

#[cfg(feature = "serverless-azure")]
#[cfg_attr(docsrs, doc(cfg(feature = "serverless-azure")))]
pub mod azure_functions;

#[cfg(feature = "serverless-azure")]
#[cfg_attr(docsrs, doc(cfg(feature = "serverless-azure")))]
pub use azure_functions::*;
