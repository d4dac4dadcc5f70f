//! Shared infrastructure for the research agent Lambda function.
//!
//! This crate provides the pieces of the handler that are independent of the
//! crew itself:
//!
//! - [`ResponseEnvelope`]: status/body envelope in the serverless handler
//!   convention, with the body JSON-encoded as a string
//! - [`ResearchEvent`]: incoming event shape with topic validation
//! - [`init_tracing`]: JSON-formatted tracing for CloudWatch Logs
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides a scripted crew double and event
//! builders for handler testing. Enable the `test-utils` feature to access it
//! from dependent crates.

#![deny(warnings)]

mod envelope;
mod request;
mod tracing_init;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use envelope::{
    ResponseEnvelope, INTERNAL_ERROR_MESSAGE, MISSING_TOPIC_ERROR, MISSING_TOPIC_MESSAGE,
};
pub use request::{EventBody, ResearchEvent};
pub use tracing_init::init_tracing;
