//! Best-effort client for the external tracing backend.
//!
//! The client is created once at startup and shared across invocations.
//! Spans are buffered in memory and shipped in batches by [`TraceClient::flush`];
//! the buffer is internally synchronized, so concurrent invocations may record
//! spans without handler-side locking.

use std::env;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Environment variable naming the tracing backend base URL.
pub const TRACING_HOST_ENV: &str = "TECHRESEARCH_TRACING_HOST";
/// Public half of the tracing credentials.
pub const TRACING_PUBLIC_KEY_ENV: &str = "TECHRESEARCH_TRACING_PUBLIC_KEY";
/// Secret half of the tracing credentials.
pub const TRACING_SECRET_KEY_ENV: &str = "TECHRESEARCH_TRACING_SECRET_KEY";

const AUTH_CHECK_PATH: &str = "/api/auth/check";
const INGEST_PATH: &str = "/api/ingest";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the tracing backend.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    pub host: String,
    pub public_key: String,
    pub secret_key: String,
}

impl TraceConfig {
    /// Read the configuration from the environment. Returns `None` unless
    /// host and both credential halves are all present and non-empty.
    pub fn from_env() -> Option<Self> {
        Self::from_values(
            env::var(TRACING_HOST_ENV).ok(),
            env::var(TRACING_PUBLIC_KEY_ENV).ok(),
            env::var(TRACING_SECRET_KEY_ENV).ok(),
        )
    }

    fn from_values(
        host: Option<String>,
        public_key: Option<String>,
        secret_key: Option<String>,
    ) -> Option<Self> {
        match (host, public_key, secret_key) {
            (Some(host), Some(public_key), Some(secret_key))
                if !host.trim().is_empty()
                    && !public_key.trim().is_empty()
                    && !secret_key.trim().is_empty() =>
            {
                Some(Self {
                    host: host.trim().trim_end_matches('/').to_string(),
                    public_key: public_key.trim().to_string(),
                    secret_key: secret_key.trim().to_string(),
                })
            }
            _ => None,
        }
    }
}

/// One recorded unit of traced work, buffered until the next flush.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub name: String,
    pub started_at: String,
    pub ended_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

#[derive(Debug, Serialize)]
struct IngestBatch<'a> {
    batch: &'a [TraceEvent],
}

/// Client for the tracing backend, shared for the process lifetime.
pub struct TraceClient {
    client: Client,
    config: TraceConfig,
    buffer: Mutex<Vec<TraceEvent>>,
}

impl TraceClient {
    /// Build a client without contacting the backend.
    pub fn new(config: TraceConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            buffer: Mutex::new(Vec::new()),
        })
    }

    /// Verify the configured credentials against the backend.
    ///
    /// 401/403 are clean rejections; any other non-success status is an error.
    pub fn auth_check(&self) -> Result<bool> {
        let url = format!("{}{}", self.config.host, AUTH_CHECK_PATH);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.public_key, Some(&self.config.secret_key))
            .send()?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            _ => {
                response.error_for_status()?;
                Ok(false)
            }
        }
    }

    /// Open a span. The span records itself into the buffer when dropped, so
    /// early returns still capture the attempt.
    pub fn span(&self, name: &str) -> TraceSpan<'_> {
        TraceSpan {
            client: self,
            name: name.to_string(),
            started_at: Utc::now(),
            input: None,
            output: None,
        }
    }

    /// Ship all buffered events to the backend. A no-op when nothing has been
    /// recorded since the last flush.
    pub fn flush(&self) -> Result<()> {
        let events: Vec<TraceEvent> = {
            let mut buffer = lock_buffer(&self.buffer);
            std::mem::take(&mut *buffer)
        };

        if events.is_empty() {
            return Ok(());
        }

        let url = format!("{}{}", self.config.host, INGEST_PATH);
        self.client
            .post(&url)
            .basic_auth(&self.config.public_key, Some(&self.config.secret_key))
            .json(&IngestBatch { batch: &events })
            .send()?
            .error_for_status()?;

        debug!(count = events.len(), "trace events flushed");
        Ok(())
    }

    /// Number of events waiting for the next flush.
    pub fn pending_events(&self) -> usize {
        lock_buffer(&self.buffer).len()
    }

    fn record(&self, event: TraceEvent) {
        lock_buffer(&self.buffer).push(event);
    }
}

// A poisoned buffer still holds valid events; recover rather than losing them.
fn lock_buffer(buffer: &Mutex<Vec<TraceEvent>>) -> std::sync::MutexGuard<'_, Vec<TraceEvent>> {
    match buffer.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Guard for one traced unit of work.
pub struct TraceSpan<'a> {
    client: &'a TraceClient,
    name: String,
    started_at: DateTime<Utc>,
    input: Option<Value>,
    output: Option<Value>,
}

impl TraceSpan<'_> {
    /// Attach the invocation input and crew output to the current trace.
    pub fn record_io(&mut self, input: Value, output: Value) {
        self.input = Some(input);
        self.output = Some(output);
    }
}

impl Drop for TraceSpan<'_> {
    fn drop(&mut self) {
        let event = TraceEvent {
            name: std::mem::take(&mut self.name),
            started_at: self.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            ended_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            input: self.input.take(),
            output: self.output.take(),
        };
        self.client.record(event);
    }
}

/// Build the process-wide trace client.
///
/// Best effort: missing configuration, a rejected auth check, or any setup
/// error leaves tracing disabled for the process lifetime and never blocks
/// request handling.
pub fn setup_trace_client() -> Option<TraceClient> {
    let config = match TraceConfig::from_env() {
        Some(config) => config,
        None => {
            debug!("tracing credentials not configured; tracing disabled");
            return None;
        }
    };

    match connect(config) {
        Ok(client) => {
            info!("trace client authenticated");
            Some(client)
        }
        Err(e) => {
            warn!(error = %e, "tracing setup failed; continuing without tracing");
            None
        }
    }
}

fn connect(config: TraceConfig) -> Result<TraceClient> {
    let client = TraceClient::new(config)?;
    if client.auth_check()? {
        Ok(client)
    } else {
        Err(Error::TraceAuthRejected)
    }
}
