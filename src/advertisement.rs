//! Advertisement records submitted by clients.
//!
//! An advertisement is a loosely structured JSON object. Only `title`,
//! `description` and `city` are recognized; every other field is carried
//! through to the document store untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::NeighborlyError;

/// Logical database holding advertisements.
pub const DATABASE_NAME: &str = "neighborlydb";
/// Collection advertisements are inserted into.
pub const COLLECTION_NAME: &str = "advertisements";

/// Title used in the creation event when the request has none.
pub const DEFAULT_TITLE: &str = "New Advertisement";

pub const FIELD_TITLE: &str = "title";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_CITY: &str = "city";

/// A classified-listing record, exactly as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Advertisement {
    fields: Map<String, Value>,
}

impl Advertisement {
    /// Parse a request body strictly as a single JSON object.
    ///
    /// Whitespace-only bodies count as missing. Any other JSON value
    /// (array, string, number, `null`) is rejected.
    pub fn parse(body: &[u8]) -> crate::Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(NeighborlyError::MissingBody);
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| NeighborlyError::InvalidBody(e.to_string()))?;

        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(NeighborlyError::InvalidBody(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Build an advertisement from an already parsed map.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Raw value of any field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Title as it should appear in a creation event.
    pub fn title(&self) -> String {
        self.text(FIELD_TITLE).unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    /// Description as it should appear in a creation event.
    pub fn description(&self) -> String {
        self.text(FIELD_DESCRIPTION).unwrap_or_default()
    }

    /// City as it should appear in a creation event.
    pub fn city(&self) -> String {
        self.text(FIELD_CITY).unwrap_or_default()
    }

    /// All fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the advertisement, returning the document to persist.
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    // Strings are taken verbatim; other scalars and containers are rendered
    // as JSON text. `null` counts as absent.
    fn text(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
