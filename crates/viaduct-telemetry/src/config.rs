//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for the logging bootstrap.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name recorded on log lines.
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or any
    /// `EnvFilter` directive string.
    pub log_level: String,

    /// Whether to emit JSON formatted logs (for log shippers) instead of
    /// human-readable output.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "viaduct".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VIADUCT_SERVICE_NAME`: Service name (default: viaduct)
    /// - `VIADUCT_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `VIADUCT_JSON_LOGS`: Enable JSON logs (default: false, true in
    ///   containers)
    #[must_use]
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("VIADUCT_SERVICE_NAME")
                .unwrap_or_else(|_| "viaduct".to_string()),

            log_level: env::var("VIADUCT_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("VIADUCT_JSON_LOGS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(is_container),
        }
    }
}
