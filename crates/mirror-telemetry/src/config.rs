//! Telemetry configuration from environment variables.

use std::env;

/// Crates whose events `engine_log_level` applies to.
const ENGINE_TARGETS: &[&str] = &["ledger_reconstruction", "mirror_telemetry"];

/// Configuration for logs, traces and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    /// Traces are only exported when set.
    pub otlp_endpoint: Option<String>,
    /// Base filter for every target.
    pub log_level: String,
    /// Overrides `log_level` for the engine crates, so scan and correction
    /// events can be turned up without the dependencies' noise.
    pub engine_log_level: Option<String>,
    pub console_output: bool,
    pub json_logs: bool,
    /// Network label (testnet, mainnet, previewnet).
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "mirror-ledger".to_string(),
            otlp_endpoint: None,
            log_level: "info".to_string(),
            engine_log_level: None,
            console_output: true,
            json_logs: false,
            network: "testnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Read `OTEL_SERVICE_NAME`, `OTEL_EXPORTER_OTLP_ENDPOINT`,
    /// `MIRROR_LOG_LEVEL` (or `RUST_LOG`), `MIRROR_ENGINE_LOG_LEVEL`,
    /// `MIRROR_CONSOLE_OUTPUT`, `MIRROR_JSON_LOGS` and `MIRROR_NETWORK`.
    /// JSON logs default on inside containers.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let in_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: non_empty("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            otlp_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
            log_level: non_empty("MIRROR_LOG_LEVEL")
                .or_else(|| non_empty("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            engine_log_level: non_empty("MIRROR_ENGINE_LOG_LEVEL"),
            console_output: flag("MIRROR_CONSOLE_OUTPUT").unwrap_or(defaults.console_output),
            json_logs: flag("MIRROR_JSON_LOGS").unwrap_or(in_container),
            network: non_empty("MIRROR_NETWORK").unwrap_or(defaults.network),
        }
    }

    /// Service name qualified by network, used as the trace resource name.
    pub fn full_service_name(&self) -> String {
        format!("{}-{}", self.service_name, self.network)
    }

    /// `EnvFilter` directive: the base level, then the engine override.
    pub fn filter_directive(&self) -> String {
        match &self.engine_log_level {
            Some(level) => ENGINE_TARGETS
                .iter()
                .fold(self.log_level.clone(), |directive, target| {
                    format!("{},{}={}", directive, target, level)
                }),
            None => self.log_level.clone(),
        }
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn flag(name: &str) -> Option<bool> {
    non_empty(name).map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
}
