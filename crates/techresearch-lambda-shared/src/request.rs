//! Incoming event shape and topic validation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::envelope::ResponseEnvelope;

/// Raw invocation event.
///
/// The topic may arrive at the top level or nested under `body`, depending on
/// how the function is fronted. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<EventBody>,
}

/// Nested body carrying the topic when the event is proxied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl ResearchEvent {
    /// Resolve the topic: top level first, then the nested body. Empty and
    /// whitespace-only values count as absent.
    pub fn topic(&self) -> Option<&str> {
        let top = self
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        top.or_else(|| {
            self.body
                .as_ref()
                .and_then(|body| body.topic.as_deref())
                .map(str::trim)
                .filter(|t| !t.is_empty())
        })
    }

    /// Validate and extract the topic, or produce the ready-made 400
    /// envelope. No external call has been made when this fails.
    ///
    /// Returns a boxed envelope to avoid a large `Result::Err` variant.
    pub fn require_topic(&self, request_id: &str) -> Result<String, Box<ResponseEnvelope>> {
        match self.topic() {
            Some(topic) => Ok(topic.to_string()),
            None => {
                warn!(request_id = %request_id, "event carried no usable topic");
                Err(Box::new(ResponseEnvelope::missing_topic()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> ResearchEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn top_level_topic_resolves() {
        let event = event(json!({"topic": "Quantum Computing"}));
        assert_eq!(event.topic(), Some("Quantum Computing"));
    }

    #[test]
    fn nested_topic_resolves() {
        let event = event(json!({"body": {"topic": "Blockchain Technology"}}));
        assert_eq!(event.topic(), Some("Blockchain Technology"));
    }

    #[test]
    fn top_level_wins_over_nested() {
        let event = event(json!({"topic": "Edge Computing", "body": {"topic": "Other"}}));
        assert_eq!(event.topic(), Some("Edge Computing"));
    }

    #[test]
    fn empty_top_level_falls_through_to_nested() {
        let event = event(json!({"topic": "", "body": {"topic": "5G Networks"}}));
        assert_eq!(event.topic(), Some("5G Networks"));
    }

    #[test]
    fn whitespace_only_topic_is_absent() {
        let event = event(json!({"topic": "   "}));
        assert_eq!(event.topic(), None);
    }

    #[test]
    fn wrong_key_is_absent() {
        let event = event(json!({"subject": "Robotics"}));
        assert_eq!(event.topic(), None);
    }

    #[test]
    fn topic_is_trimmed() {
        let event = event(json!({"topic": "  Artificial Intelligence  "}));
        assert_eq!(event.topic(), Some("Artificial Intelligence"));
    }

    #[test]
    fn require_topic_returns_the_400_envelope() {
        let event = event(json!({}));
        let envelope = event.require_topic("test-request-1").unwrap_err();
        assert_eq!(envelope.status_code, 400);

        let body = envelope.body_json().unwrap();
        assert_eq!(body["error"], crate::MISSING_TOPIC_ERROR);
    }

    #[test]
    fn require_topic_passes_through_valid_topic() {
        let event = event(json!({"topic": "Quantum Computing"}));
        let topic = event.require_topic("test-request-2").unwrap();
        assert_eq!(topic, "Quantum Computing");
    }
}
