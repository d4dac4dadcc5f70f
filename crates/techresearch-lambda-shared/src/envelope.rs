//! Response envelope in the serverless handler convention.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic message attached to 500 responses.
pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred while processing the research request";
/// Error string for a missing or empty topic.
pub const MISSING_TOPIC_ERROR: &str = "Missing 'topic' parameter";
/// User-facing message for a missing or empty topic.
pub const MISSING_TOPIC_MESSAGE: &str = "Please provide a topic to research";

/// Envelope handed back to the invoking runtime: a status code plus a
/// JSON-encoded body string.
///
/// Constructed and returned within a single invocation, never mutated
/// afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

#[derive(Debug, Serialize)]
struct SuccessBody<'a> {
    success: bool,
    topic: &'a str,
    report: &'a Value,
    timestamp: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    message: &'a str,
}

impl ResponseEnvelope {
    /// 200 envelope carrying the topic, the report, and the completion
    /// timestamp.
    pub fn success(topic: &str, report: &Value, timestamp: &str) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            body: encode_body(&SuccessBody {
                success: true,
                topic,
                report,
                timestamp,
            }),
        }
    }

    /// 400 envelope with a specific validation error.
    pub fn bad_request(error: &str, message: &str) -> Self {
        Self {
            status_code: StatusCode::BAD_REQUEST.as_u16(),
            body: encode_body(&ErrorBody {
                success: false,
                error,
                message,
            }),
        }
    }

    /// The 400 envelope for an absent or empty topic.
    pub fn missing_topic() -> Self {
        Self::bad_request(MISSING_TOPIC_ERROR, MISSING_TOPIC_MESSAGE)
    }

    /// 500 envelope carrying the error's string form plus the generic
    /// user-facing message.
    pub fn internal_error(error: &str) -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            body: encode_body(&ErrorBody {
                success: false,
                error,
                message: INTERNAL_ERROR_MESSAGE,
            }),
        }
    }

    /// Decode the body string, for tests and the smoke CLI.
    pub fn body_json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

// The body structs hold only strings and JSON values, so serialization
// cannot fail in practice; the fallback keeps the handler panic-free.
fn encode_body<T: Serialize>(body: &T) -> String {
    serde_json::to_string(body).unwrap_or_else(|_| {
        format!(
            r#"{{"success":false,"error":"response serialization failed","message":"{}"}}"#,
            INTERNAL_ERROR_MESSAGE
        )
    })
}
