use std::time::Duration;

use crate::config::TopicCredentials;
use crate::errors::parse_error_response;
use crate::events::CreationEvent;
use crate::publisher::EventPublisher;
use crate::BoxFuture;

const API_VERSION: &str = "2018-01-01";
const SAS_KEY_HEADER: &str = "aeg-sas-key";

/// Publishes events to an Event Grid topic over HTTPS.
///
/// The underlying reqwest client pools connections, so a single publisher
/// should be shared across invocations.
#[derive(Clone, Debug)]
pub struct EventGridPublisher {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl EventGridPublisher {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Set a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn send(&self, topic: &TopicCredentials, events: &[CreationEvent]) -> crate::Result<()> {
        let mut req = self
            .client
            .post(&topic.endpoint)
            .query(&[("api-version", API_VERSION)])
            .header(SAS_KEY_HEADER, topic.key.as_str())
            .json(events);

        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await?;
            return Err(parse_error_response(&body, status.as_u16()));
        }

        tracing::debug!(
            endpoint = %topic.endpoint,
            count = events.len(),
            "events accepted by topic"
        );
        Ok(())
    }
}

impl Default for EventGridPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for EventGridPublisher {
    fn publish<'a>(
        &'a self,
        topic: &'a TopicCredentials,
        events: &'a [CreationEvent],
    ) -> BoxFuture<'a, crate::Result<()>> {
        Box::pin(self.send(topic, events))
    }
}
