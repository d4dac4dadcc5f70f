use thiserror::Error;

/// Convenient result alias for the research agent workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A required secret is neither in the environment nor in the store.
    #[error("secret {name} is not available from the environment or the configured store")]
    MissingSecret { name: String },

    /// The secret store returned a document that could not be parsed.
    #[error("secret store returned a malformed document: {message}")]
    SecretDocumentParse { message: String },

    /// The crew service base URL is not configured.
    #[error("crew endpoint is not configured; set {var}")]
    CrewEndpointUnset { var: &'static str },

    /// The crew service rejected or failed the kickoff request.
    #[error("crew execution failed with status {status}: {message}")]
    CrewRejected { status: u16, message: String },

    /// The crew service responded with a payload we could not decode.
    #[error("crew returned a malformed response: {message}")]
    CrewResponseParse { message: String },

    /// The tracing backend refused the configured credentials.
    #[error("tracing backend rejected the configured credentials")]
    TraceAuthRejected,

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
