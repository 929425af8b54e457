//! Core types for the Woopra tracking backend.
//!
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Forwarder, HTTP client and observability configuration

mod config;
mod errors;

pub use config::{ClientConfig, Config, ObservabilityConfig, WoopraConfig, DEFAULT_IDLE_TIMEOUT_MS};
pub use errors::{Error, Result};
