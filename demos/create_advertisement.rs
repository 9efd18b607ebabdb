//! Create an advertisement and observe its creation event locally.
//!
//! Reads `MyDbConnection`, `EventGridTopicEndpoint` and `EventGridTopicKey`
//! from the environment. Without the topic settings the ingest still runs
//! and logs that publishing was skipped.
//!
//! ```sh
//! MyDbConnection=mongodb://localhost:27017 RUST_LOG=debug \
//!     cargo run --example create_advertisement
//! ```

use neighborly::{EventObserver, FunctionsConfig, IngestHandler, ObservedEvent};
use serde_json::json;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = FunctionsConfig::from_env()
        .store_timeout(Duration::from_secs(5))
        .publish_timeout(Duration::from_secs(5));
    let handler = IngestHandler::from_config(config);

    // 1. Ingest a well-formed advertisement
    let body = json!({
        "title": "Lawnmower",
        "description": "Free to a good home",
        "city": "Springfield",
        "price": 0
    })
    .to_string();
    let outcome = handler.ingest(body.as_bytes()).await;
    println!(
        "HTTP {} -> {} (publish: {:?})",
        outcome.response.status,
        outcome.response.body_text(),
        outcome.publish
    );

    // 2. A body that is not a JSON object
    let response = handler.handle(b"[\"not\", \"an\", \"object\"]").await;
    println!("HTTP {} -> {}", response.status, response.body_text());

    // 3. What the observer logs for a delivered creation event
    if let Some(id) = outcome.advertisement_id {
        let event = ObservedEvent::new(
            "local-1",
            "local",
            neighborly::events::SUBJECT_ADVERTISEMENT_CREATED,
            neighborly::events::EVENT_ADVERTISEMENT_CREATED,
        )
        .with_data(json!({ "id": id }));
        EventObserver::new().observe(&event);
    }
}
