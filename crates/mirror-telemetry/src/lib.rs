//! # Mirror Telemetry
//!
//! Observability for the mirror ledger engine.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by a console layer (pretty or JSON)
//! - **Traces**: OpenTelemetry OTLP export when an endpoint is configured
//! - **Metrics**: Prometheus counters, gauges and histograms
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mirror_telemetry::{TelemetryConfig, init_telemetry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).await.expect("Failed to init telemetry");
//!
//!     // Engine queries now emit spans, logs and metrics
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset | Trace exporter endpoint |
//! | `OTEL_SERVICE_NAME` | `mirror-ledger` | Service name in traces |
//! | `MIRROR_LOG_LEVEL` | `info` | Log level filter |
//! | `MIRROR_ENGINE_LOG_LEVEL` | unset | Level for the engine crates only |
//! | `MIRROR_JSON_LOGS` | `false` | JSON console output |
//! | `MIRROR_NETWORK` | `testnet` | Network label |

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, QueryTimer, ACTIVE_STORE_SCOPES, LEDGER_ERRORS,
    LEDGER_QUERIES, LEDGER_QUERY_DURATION, SCAN_BATCHES, STORE_TIMEOUTS, TRANSFER_CORRECTIONS,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize OpenTelemetry tracer: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize metrics and the global tracing subscriber.
///
/// Returns a guard that must be held for the lifetime of the application.
/// When dropped, it flushes pending spans.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    let tracing_guard = tracing_setup::init_tracing(&config).await?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
    })
}

/// Guard that keeps telemetry active. Drop to flush and shutdown.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_service_name() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "mirror-ledger");
    }

    #[tokio::test]
    async fn test_init_telemetry_without_exporter() {
        let config = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        };
        // A second global subscriber in the same test binary is rejected; only
        // the first call can succeed.
        if let Ok(guard) = init_telemetry(config).await {
            drop(guard);
        }
        assert!(register_metrics().is_ok());
    }
}
