use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Fixed response messages
// ---------------------------------------------------------------------------

/// Plain-text body returned with a 400 when the request body is unusable.
pub const MSG_MISSING_BODY: &str = "Please pass an advertisement JSON object in the request body";

/// Plain-text body returned with a 500 when the document store is unreachable.
pub const MSG_STORE_UNAVAILABLE: &str = "Could not connect to mongodb";

// ---------------------------------------------------------------------------
// Main crate error type
// ---------------------------------------------------------------------------

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum NeighborlyError {
    /// The request carried no body.
    #[error("request body is empty")]
    MissingBody,

    /// The request body is not a single JSON object.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The document store could not be reached or no connection string is set.
    #[error("store connection error: {0}")]
    StoreConnection(String),

    /// The document store rejected the insert.
    #[error("store error: {0}")]
    Store(String),

    /// A structured error returned by the event bus.
    #[error("{0}")]
    Service(Box<ServiceError>),

    /// HTTP transport error while talking to the event bus.
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration is incomplete or malformed.
    #[error("config error: {0}")]
    Config(String),

    /// No function is registered under the invoked name.
    #[error("no function registered with name: {0}")]
    UnknownFunction(String),
}

impl NeighborlyError {
    /// HTTP status the ingest handler answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            NeighborlyError::MissingBody | NeighborlyError::InvalidBody(_) => 400,
            _ => 500,
        }
    }

    /// Returns `true` for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        self.status_code() == 400
    }
}

impl From<ServiceError> for NeighborlyError {
    fn from(err: ServiceError) -> Self {
        NeighborlyError::Service(Box::new(err))
    }
}

#[cfg(feature = "reqwest-transport")]
impl From<reqwest::Error> for NeighborlyError {
    fn from(err: reqwest::Error) -> Self {
        NeighborlyError::Transport(err.to_string())
    }
}

#[cfg(feature = "mongodb-store")]
impl From<mongodb::error::Error> for NeighborlyError {
    fn from(err: mongodb::error::Error) -> Self {
        NeighborlyError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for NeighborlyError {
    fn from(err: serde_json::Error) -> Self {
        NeighborlyError::Serialization(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Service error (structured error from the event bus)
// ---------------------------------------------------------------------------

#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceError {
    pub code: String,
    pub message: String,
    #[serde(skip)]
    pub http_status: u16,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    /// Create a new service error.
    pub fn new(code: impl Into<String>, message: impl Into<String>, http_status: u16) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            http_status,
        }
    }

    /// Returns the machine-readable error code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns `true` if the bus rejected the access key.
    pub fn is_unauthorized(&self) -> bool {
        self.http_status == 401 || self.http_status == 403
    }
}

// ---------------------------------------------------------------------------
// Wire format for parsing event bus error responses
// ---------------------------------------------------------------------------

#[cfg_attr(not(feature = "reqwest-transport"), allow(dead_code))]
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ServiceErrorPayload,
}

#[cfg_attr(not(feature = "reqwest-transport"), allow(dead_code))]
#[derive(Debug, Deserialize)]
pub(crate) struct ServiceErrorPayload {
    pub code: String,
    pub message: String,
}

#[cfg_attr(not(feature = "reqwest-transport"), allow(dead_code))]
impl ServiceErrorPayload {
    pub fn into_service_error(self, http_status: u16) -> ServiceError {
        ServiceError {
            code: self.code,
            message: self.message,
            http_status,
        }
    }
}

/// Turn a non-success response body into a [`NeighborlyError`].
#[cfg_attr(not(feature = "reqwest-transport"), allow(dead_code))]
pub(crate) fn parse_error_response(body: &[u8], status_code: u16) -> NeighborlyError {
    if let Ok(err_resp) = serde_json::from_slice::<ErrorResponse>(body) {
        NeighborlyError::from(err_resp.error.into_service_error(status_code))
    } else {
        let message = String::from_utf8_lossy(body).to_string();
        NeighborlyError::from(ServiceError {
            code: format!("http_{}", status_code),
            message: if message.is_empty() {
                format!("HTTP {}", status_code)
            } else {
                message
            },
            http_status: status_code,
        })
    }
}

// ---------------------------------------------------------------------------
// Result type alias
// ---------------------------------------------------------------------------

pub type Result<T> = std::result::Result<T, NeighborlyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_error() {
        let body = br#"{"error":{"code":"Unauthorized","message":"bad key"}}"#;
        match parse_error_response(body, 401) {
            NeighborlyError::Service(err) => {
                assert_eq!(err.code(), "Unauthorized");
                assert_eq!(err.message, "bad key");
                assert!(err.is_unauthorized());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_unstructured_error() {
        match parse_error_response(b"", 503) {
            NeighborlyError::Service(err) => {
                assert_eq!(err.code, "http_503");
                assert_eq!(err.message, "HTTP 503");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
