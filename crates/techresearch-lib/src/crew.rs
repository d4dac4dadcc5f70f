//! The crew seam: kickoff inputs, report forms, and the HTTP-delegated crew.
//!
//! The multi-agent orchestration engine runs as its own deployment; this
//! module only knows how to hand it a topic and interpret what comes back.

use std::env;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Environment variable naming the crew service base URL.
pub const CREW_ENDPOINT_ENV: &str = "TECHRESEARCH_CREW_ENDPOINT";

/// Crew runs involve several LLM round-trips, so the client timeout is
/// generous; the host runtime enforces the real deadline.
const KICKOFF_TIMEOUT: Duration = Duration::from_secs(900);

/// Fixed-shape inputs handed to the crew for one research run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewInputs {
    pub topic: String,
    pub current_year: String,
}

/// Report produced by a completed crew run.
///
/// Crews that define an output schema return a structured report; the rest
/// return their final answer as plain text. Callers pick the form they need
/// instead of probing the payload shape at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CrewReport {
    Structured(Value),
    Text(String),
}

impl CrewReport {
    /// JSON value for the response body: the structured report when present,
    /// otherwise the textual form.
    pub fn to_value(&self) -> Value {
        match self {
            CrewReport::Structured(value) => value.clone(),
            CrewReport::Text(text) => Value::String(text.clone()),
        }
    }

    /// Textual rendering, used when recording trace output.
    pub fn to_text(&self) -> String {
        match self {
            CrewReport::Structured(value) => value.to_string(),
            CrewReport::Text(text) => text.clone(),
        }
    }
}

/// A research crew that can be kicked off with a set of inputs.
///
/// Implementations perform exactly one attempt per call; there is no retry
/// policy at this seam.
pub trait Crew: Send + Sync {
    fn kickoff(&self, inputs: &CrewInputs) -> Result<CrewReport>;
}

/// Crew implementation that delegates `kickoff` to the deployed crew service.
#[derive(Debug)]
pub struct HttpCrew {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct KickoffRequest<'a> {
    inputs: &'a CrewInputs,
}

#[derive(Debug, Deserialize)]
struct KickoffResponse {
    /// Final textual answer of the crew run.
    output: String,
    /// Structured report, present only when the crew defines an output schema.
    #[serde(default)]
    structured: Option<Value>,
}

impl HttpCrew {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .timeout(KICKOFF_TIMEOUT)
            .user_agent(user_agent())
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Build the crew from `TECHRESEARCH_CREW_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        match env::var(CREW_ENDPOINT_ENV) {
            Ok(endpoint) if !endpoint.trim().is_empty() => Self::new(endpoint.trim()),
            _ => Err(Error::CrewEndpointUnset {
                var: CREW_ENDPOINT_ENV,
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn user_agent() -> String {
    format!("techresearch-lib/{}", env!("CARGO_PKG_VERSION"))
}

impl Crew for HttpCrew {
    fn kickoff(&self, inputs: &CrewInputs) -> Result<CrewReport> {
        let url = format!("{}/execute", self.endpoint);
        debug!(url = %url, topic = %inputs.topic, "dispatching kickoff to crew service");

        let response = self
            .client
            .post(&url)
            .json(&KickoffRequest { inputs })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(Error::CrewRejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: KickoffResponse = response.json().map_err(|e| Error::CrewResponseParse {
            message: e.to_string(),
        })?;

        info!(
            topic = %inputs.topic,
            structured = body.structured.is_some(),
            "crew run completed"
        );

        Ok(match body.structured {
            Some(value) => CrewReport::Structured(value),
            None => CrewReport::Text(body.output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inputs_serialize_with_fixed_shape() {
        let inputs = CrewInputs {
            topic: "Quantum Computing".to_string(),
            current_year: "2026".to_string(),
        };
        let value = serde_json::to_value(&inputs).unwrap();
        assert_eq!(
            value,
            json!({"topic": "Quantum Computing", "current_year": "2026"})
        );
    }

    #[test]
    fn structured_report_wins_over_text_rendering() {
        let report = CrewReport::Structured(json!({"title": "5G", "sections": []}));
        assert_eq!(report.to_value(), json!({"title": "5G", "sections": []}));

        let report = CrewReport::Text("plain answer".to_string());
        assert_eq!(report.to_value(), Value::String("plain answer".into()));
    }

    #[test]
    fn report_text_rendering() {
        let report = CrewReport::Structured(json!({"title": "AI"}));
        assert_eq!(report.to_text(), r#"{"title":"AI"}"#);

        let report = CrewReport::Text("summary".to_string());
        assert_eq!(report.to_text(), "summary");
    }

    #[test]
    fn kickoff_response_structured_is_optional() {
        let body: KickoffResponse =
            serde_json::from_value(json!({"output": "the report text"})).unwrap();
        assert_eq!(body.output, "the report text");
        assert!(body.structured.is_none());

        let body: KickoffResponse = serde_json::from_value(
            json!({"output": "text", "structured": {"title": "Edge Computing"}}),
        )
        .unwrap();
        assert!(body.structured.is_some());
    }

    // Single test covering both env states: parallel tests must not race on
    // the shared CREW_ENDPOINT_ENV variable.
    #[test]
    fn from_env_requires_endpoint() {
        env::remove_var(CREW_ENDPOINT_ENV);
        let err = HttpCrew::from_env().unwrap_err();
        assert!(matches!(err, Error::CrewEndpointUnset { .. }));

        env::set_var(CREW_ENDPOINT_ENV, "http://crew.internal/");
        let crew = HttpCrew::from_env().unwrap();
        assert_eq!(crew.endpoint(), "http://crew.internal");
        env::remove_var(CREW_ENDPOINT_ENV);
    }
}
