//! Event-triggered observer that records every event it is handed.

use serde::Serialize;

use crate::events::ObservedEvent;

/// The fields of an event that end up in the log line.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary<'a> {
    pub id: &'a str,
    pub data: Option<&'a serde_json::Value>,
    pub topic: &'a str,
    pub subject: &'a str,
    pub event_type: &'a str,
}

impl<'a> EventSummary<'a> {
    pub fn of(event: &'a ObservedEvent) -> Self {
        Self {
            id: &event.id,
            data: event.data.as_ref(),
            topic: &event.topic,
            subject: &event.subject,
            event_type: &event.event_type,
        }
    }

    /// Render as a single JSON line.
    pub fn to_log_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                "{{\"id\":{:?},\"topic\":{:?},\"subject\":{:?},\"event_type\":{:?},\"error\":{:?}}}",
                self.id,
                self.topic,
                self.subject,
                self.event_type,
                e.to_string()
            )
        })
    }
}

/// Logs events delivered by the bus. No filtering by event type.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventObserver;

impl EventObserver {
    pub fn new() -> Self {
        Self
    }

    /// Record one event.
    pub fn observe(&self, event: &ObservedEvent) {
        tracing::info!(event.id = %event.id, "event observer started");

        let summary = EventSummary::of(event).to_log_line();
        tracing::info!(
            event.id = %event.id,
            event.r#type = %event.event_type,
            summary = %summary,
            "processed an event"
        );

        if let Some(data) = &event.data {
            tracing::info!(event.id = %event.id, data = %data, "event data");
        }

        tracing::info!(event.id = %event.id, "event observer completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_contains_all_fields() {
        let event = ObservedEvent::new(
            "e1",
            "t",
            "advertisement/created",
            "Neighborly.Advertisement.Created",
        )
        .with_data(json!({"id": "abc"}));

        let line = EventSummary::of(&event).to_log_line();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed["id"], "e1");
        assert_eq!(parsed["topic"], "t");
        assert_eq!(parsed["subject"], "advertisement/created");
        assert_eq!(parsed["event_type"], "Neighborly.Advertisement.Created");
        assert_eq!(parsed["data"], json!({"id": "abc"}));
    }

    #[test]
    fn test_summary_without_data_is_null() {
        let event = ObservedEvent::new("e2", "t", "s", "Other");
        let line = EventSummary::of(&event).to_log_line();
        assert!(line.contains("\"data\":null"));
    }

    #[test]
    fn test_observe_does_not_panic() {
        let event = ObservedEvent::new("e3", "", "", "Any").with_data(json!([1, 2, 3]));
        EventObserver::new().observe(&event);
    }
}
