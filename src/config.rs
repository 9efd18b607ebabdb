use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Environment variable holding the document store connection string.
pub const ENV_STORE_URL: &str = "MyDbConnection";
/// Environment variable holding the Event Grid topic endpoint.
pub const ENV_TOPIC_ENDPOINT: &str = "EventGridTopicEndpoint";
/// Environment variable holding the Event Grid topic access key.
pub const ENV_TOPIC_KEY: &str = "EventGridTopicKey";

/// Settings shared by the Neighborly functions.
///
/// Handlers receive this value at construction time instead of reading the
/// process environment inline, so tests can build it directly.
///
/// # Example
///
/// ```rust
/// use neighborly::FunctionsConfig;
///
/// let config = FunctionsConfig::new()
///     .store_url("mongodb://localhost:27017")
///     .topic_endpoint("https://ads.westeurope-1.eventgrid.azure.net/api/events")
///     .topic_key("secret")
///     .publish_timeout(std::time::Duration::from_secs(5));
///
/// assert!(config.topic().is_some());
/// ```
#[derive(Clone, Default)]
pub struct FunctionsConfig {
    /// Document store connection string.
    pub store_url: Option<String>,
    /// Event Grid topic endpoint.
    pub topic_endpoint: Option<String>,
    /// Event Grid topic access key.
    pub topic_key: Option<String>,
    /// Timeout for a single publish request.
    pub publish_timeout: Option<Duration>,
    /// Server selection timeout for the document store.
    pub store_timeout: Option<Duration>,
}

const REDACTED: &str = "<redacted>";

/// Endpoint and key of an Event Grid topic, present only as a pair.
#[derive(Clone, PartialEq, Eq)]
pub struct TopicCredentials {
    pub endpoint: String,
    pub key: String,
}

impl fmt::Debug for FunctionsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionsConfig")
            .field("store_url", &self.store_url.as_deref().map(redact_userinfo))
            .field("topic_endpoint", &self.topic_endpoint)
            .field("topic_key", &self.topic_key.as_ref().map(|_| REDACTED))
            .field("publish_timeout", &self.publish_timeout)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl fmt::Debug for TopicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicCredentials")
            .field("endpoint", &self.endpoint)
            .field("key", &REDACTED)
            .finish()
    }
}

impl FunctionsConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary lookup function.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).and_then(non_blank);
        Self {
            store_url: read(ENV_STORE_URL),
            topic_endpoint: read(ENV_TOPIC_ENDPOINT),
            topic_key: read(ENV_TOPIC_KEY),
            publish_timeout: None,
            store_timeout: None,
        }
    }

    /// Set the document store connection string.
    pub fn store_url(mut self, url: impl Into<String>) -> Self {
        self.store_url = non_blank(url.into());
        self
    }

    /// Set the Event Grid topic endpoint.
    pub fn topic_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.topic_endpoint = non_blank(endpoint.into());
        self
    }

    /// Set the Event Grid topic access key.
    pub fn topic_key(mut self, key: impl Into<String>) -> Self {
        self.topic_key = non_blank(key.into());
        self
    }

    /// Set the publish request timeout.
    pub fn publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = Some(timeout);
        self
    }

    /// Set the store server selection timeout.
    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    /// Topic credentials, if both endpoint and key are configured.
    pub fn topic(&self) -> Option<TopicCredentials> {
        match (&self.topic_endpoint, &self.topic_key) {
            (Some(endpoint), Some(key)) => Some(TopicCredentials {
                endpoint: endpoint.clone(),
                key: key.clone(),
            }),
            _ => None,
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Mask the userinfo of a connection string, leaving scheme and hosts.
fn redact_userinfo(url: &str) -> Cow<'_, str> {
    let (scheme, rest) = match url.find("://") {
        Some(i) => url.split_at(i + 3),
        None => ("", url),
    };
    let authority_end = rest.find(|c: char| c == '/' || c == '?').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => Cow::Owned(format!("{}{}{}", scheme, REDACTED, &rest[at..])),
        None => Cow::Borrowed(url),
    }
}
