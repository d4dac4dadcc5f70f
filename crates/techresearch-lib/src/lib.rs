//! Core library for the emerging-technology research agent adapter.
//!
//! The actual research work is performed by an externally deployed crew of
//! agents; this crate provides everything the deployment adapter needs around
//! that narrow seam:
//!
//! - [`Crew`]: the kickoff seam, with [`HttpCrew`] delegating to the deployed
//!   crew service
//! - [`secrets`]: startup population of the process environment from an
//!   external secret store
//! - [`trace`]: best-effort client for the external tracing backend
//! - [`Error`]: shared error type across the workspace

pub mod crew;
pub mod error;
pub mod secrets;
pub mod trace;

pub use crew::{Crew, CrewInputs, CrewReport, HttpCrew};
pub use error::{Error, Result};
pub use secrets::{
    populate_env, populate_env_from_default_store, FileSecretStore, HttpSecretStore, SecretStore,
};
pub use trace::{setup_trace_client, TraceClient, TraceConfig, TraceEvent, TraceSpan};
