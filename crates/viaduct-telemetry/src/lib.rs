//! # Viaduct Telemetry
//!
//! Structured logging bootstrap for viaduct processes.
//!
//! The middleware crates log through `tracing` macros and stay
//! backend-agnostic; a process calls [`init_telemetry`] once at startup to
//! install an env-filtered subscriber with either human-readable or JSON
//! output.
//!
//! ```rust,ignore
//! use viaduct_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config).expect("failed to init telemetry");
//!     // middleware logs now flow to the configured output
//! }
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;

pub use config::TelemetryConfig;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors from the telemetry bootstrap.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured log level is not a valid filter directive.
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter {
        /// The rejected directive string.
        filter: String,
        /// Parser diagnostics.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Install the global tracing subscriber described by `config`.
///
/// Call once per process, before the middleware starts logging. Returns
/// an error if the filter string does not parse or a subscriber is
/// already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::InvalidFilter {
            filter: config.log_level.clone(),
            message: e.to_string(),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    tracing::debug!(
        service_name = %config.service_name,
        json_logs = config.json_logs,
        "telemetry initialized"
    );
    Ok(())
}
