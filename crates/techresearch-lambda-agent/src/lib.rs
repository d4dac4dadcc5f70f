//! AWS Lambda function for the emerging-technology research agent.
//!
//! The handler validates the incoming event, hands the topic to the deployed
//! research crew, and maps the outcome into the status/body envelope. When
//! the trace client is available, each crew run is bracketed by a span and
//! flushed afterwards; when it is not, the crew is invoked directly.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use lambda_runtime::{service_fn, Error as LambdaError, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use techresearch_lambda_shared::{init_tracing, ResearchEvent, ResponseEnvelope};
use techresearch_lib::crew::{Crew, CrewInputs, CrewReport, HttpCrew};
use techresearch_lib::error::Result as LibResult;
use techresearch_lib::secrets::populate_env_from_default_store;
use techresearch_lib::trace::{setup_trace_client, TraceClient};

/// Prefix of the span bracketing each crew run.
pub const SPAN_NAME_PREFIX: &str = "emerging-technology-research-";

/// Topics are truncated to this many characters in span names.
const SPAN_TOPIC_CHARS: usize = 30;

/// Handler state: the crew and the optional trace client, injected at
/// construction and shared immutably across invocations.
pub struct ResearchHandler {
    crew: Arc<dyn Crew>,
    tracer: Option<TraceClient>,
}

impl ResearchHandler {
    pub fn new(crew: Arc<dyn Crew>, tracer: Option<TraceClient>) -> Self {
        Self { crew, tracer }
    }

    /// Handle one invocation payload. Always produces an envelope; errors
    /// never escape as panics or raised failures.
    pub fn handle(&self, payload: &Value, request_id: &str) -> ResponseEnvelope {
        let event: ResearchEvent = match serde_json::from_value(payload.clone()) {
            Ok(event) => event,
            Err(e) => {
                error!(request_id = %request_id, error = %e, "failed to parse event");
                return ResponseEnvelope::bad_request(
                    &format!("Invalid request: {}", e),
                    "Please provide a JSON event with a 'topic' field",
                );
            }
        };

        let topic = match event.require_topic(request_id) {
            Ok(topic) => topic,
            Err(envelope) => return *envelope,
        };

        info!(request_id = %request_id, topic = %topic, "handling research request");

        match self.run_crew(&topic) {
            Ok(report) => {
                info!(request_id = %request_id, topic = %topic, "research completed successfully");
                ResponseEnvelope::success(&topic, &report.to_value(), &Utc::now().to_rfc3339())
            }
            Err(e) => {
                error!(
                    request_id = %request_id,
                    topic = %topic,
                    error = %e,
                    "research request failed"
                );
                ResponseEnvelope::internal_error(&e.to_string())
            }
        }
    }

    /// One kickoff attempt, bracketed by a span when tracing is active.
    fn run_crew(&self, topic: &str) -> LibResult<CrewReport> {
        let inputs = CrewInputs {
            topic: topic.to_string(),
            current_year: Utc::now().year().to_string(),
        };

        match &self.tracer {
            Some(tracer) => {
                let report = {
                    let mut span = tracer.span(&span_name(topic));
                    let report = self.crew.kickoff(&inputs)?;
                    span.record_io(
                        serde_json::to_value(&inputs)?,
                        Value::String(report.to_text()),
                    );
                    report
                };
                tracer.flush()?;
                Ok(report)
            }
            None => self.crew.kickoff(&inputs),
        }
    }
}

/// Span name for one crew run: the fixed prefix plus the topic truncated to
/// its first 30 characters.
pub fn span_name(topic: &str) -> String {
    let truncated: String = topic.chars().take(SPAN_TOPIC_CHARS).collect();
    format!("{}{}", SPAN_NAME_PREFIX, truncated)
}

/// Build the handler from the environment: populate secrets (fatal on
/// error), set up the trace client (best effort), and configure the crew
/// endpoint (fatal when unset).
pub fn bootstrap() -> LibResult<ResearchHandler> {
    populate_env_from_default_store()?;
    let tracer = setup_trace_client();
    let crew = HttpCrew::from_env()?;
    Ok(ResearchHandler::new(Arc::new(crew), tracer))
}

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), LambdaError> {
    init_tracing();

    // Secret population and the trace auth check perform blocking HTTP.
    let handler = tokio::task::spawn_blocking(bootstrap).await??;
    let handler = Arc::new(handler);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move {
            let request_id = event.context.request_id.clone();
            let payload = event.payload;
            let envelope =
                tokio::task::spawn_blocking(move || handler.handle(&payload, &request_id)).await?;
            Ok::<ResponseEnvelope, LambdaError>(envelope)
        }
    }))
    .await
}
