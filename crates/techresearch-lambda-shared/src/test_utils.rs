//! Test utilities for handler testing.
//!
//! This module provides a scripted crew double and event builders shared by
//! the Lambda and CLI test suites.
//!
//! # Usage
//!
//! These utilities are only available in test builds:
//!
//! ```ignore
//! use techresearch_lambda_shared::test_utils::{mock_request_id, ScriptedCrew};
//!
//! #[test]
//! fn test_handler() {
//!     let crew = ScriptedCrew::succeeding_with(CrewReport::Text("report".into()));
//!     let request_id = mock_request_id("123");
//!     // ... test handler logic
//! }
//! ```

use std::sync::Mutex;

use serde_json::{json, Value};

use techresearch_lib::crew::{Crew, CrewInputs, CrewReport};
use techresearch_lib::error::{Error, Result};

/// Crew double that replays a queue of canned outcomes and records every set
/// of inputs it receives.
pub struct ScriptedCrew {
    outcomes: Mutex<Vec<Result<CrewReport>>>,
    received: Mutex<Vec<CrewInputs>>,
}

impl ScriptedCrew {
    /// Queue outcomes to be replayed in order, one per kickoff. Once the
    /// queue is exhausted, further kickoffs return a plain text report.
    pub fn new(mut outcomes: Vec<Result<CrewReport>>) -> Self {
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Crew whose single kickoff succeeds with the given report.
    pub fn succeeding_with(report: CrewReport) -> Self {
        Self::new(vec![Ok(report)])
    }

    /// Crew whose single kickoff fails with a crew-rejected error.
    pub fn failing_with(message: &str) -> Self {
        Self::new(vec![Err(Error::CrewRejected {
            status: 502,
            message: message.to_string(),
        })])
    }

    /// Inputs seen so far, in call order.
    pub fn received(&self) -> Vec<CrewInputs> {
        self.received.lock().expect("received lock").clone()
    }

    /// Number of kickoff calls made against this crew.
    pub fn kickoff_count(&self) -> usize {
        self.received.lock().expect("received lock").len()
    }
}

impl Crew for ScriptedCrew {
    fn kickoff(&self, inputs: &CrewInputs) -> Result<CrewReport> {
        self.received
            .lock()
            .expect("received lock")
            .push(inputs.clone());
        self.outcomes
            .lock()
            .expect("outcomes lock")
            .pop()
            .unwrap_or_else(|| Ok(CrewReport::Text("scripted report".to_string())))
    }
}

/// Create a mock request ID for testing.
pub fn mock_request_id(suffix: &str) -> String {
    format!("test-request-{}", suffix)
}

/// Event payload with a top-level topic.
pub fn sample_event(topic: &str) -> Value {
    json!({ "topic": topic })
}

/// Event payload with the topic nested under `body`.
pub fn sample_nested_event(topic: &str) -> Value {
    json!({ "body": { "topic": topic } })
}

/// A structured report in the shape research crews produce.
pub fn sample_structured_report() -> CrewReport {
    CrewReport::Structured(json!({
        "title": "Emerging Technology Report",
        "sections": [
            {"heading": "Overview", "content": "..."},
            {"heading": "Outlook", "content": "..."}
        ]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_crew_replays_outcomes_in_order() {
        let crew = ScriptedCrew::new(vec![
            Ok(CrewReport::Text("first".to_string())),
            Ok(CrewReport::Text("second".to_string())),
        ]);
        let inputs = CrewInputs {
            topic: "AI".to_string(),
            current_year: "2026".to_string(),
        };

        assert_eq!(
            crew.kickoff(&inputs).unwrap(),
            CrewReport::Text("first".to_string())
        );
        assert_eq!(
            crew.kickoff(&inputs).unwrap(),
            CrewReport::Text("second".to_string())
        );
        assert_eq!(crew.kickoff_count(), 2);
    }

    #[test]
    fn scripted_crew_records_inputs() {
        let crew = ScriptedCrew::succeeding_with(CrewReport::Text("r".to_string()));
        let inputs = CrewInputs {
            topic: "Robotics".to_string(),
            current_year: "2026".to_string(),
        };
        crew.kickoff(&inputs).unwrap();

        let received = crew.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].topic, "Robotics");
    }

    #[test]
    fn failing_crew_surfaces_the_error() {
        let crew = ScriptedCrew::failing_with("upstream exploded");
        let inputs = CrewInputs {
            topic: "AI".to_string(),
            current_year: "2026".to_string(),
        };
        let err = crew.kickoff(&inputs).unwrap_err();
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[test]
    fn mock_request_id_formats_correctly() {
        assert_eq!(mock_request_id("123"), "test-request-123");
    }
}
