//! Prometheus metrics for the ledger reconstruction engine.
//!
//! All metrics follow the naming convention: `mirror_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;
use std::time::Instant;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // QUERY METRICS
    // =========================================================================

    /// Engine queries by operation and outcome
    pub static ref LEDGER_QUERIES: CounterVec = CounterVec::new(
        Opts::new("mirror_ledger_queries_total", "Engine queries served"),
        &["operation", "outcome"]  // outcome: ok/error
    ).expect("metric creation failed");

    /// Engine query latency
    pub static ref LEDGER_QUERY_DURATION: HistogramVec = HistogramVec::new(
        prometheus::HistogramOpts::new(
            "mirror_ledger_query_duration_seconds",
            "Time spent answering an engine query"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");

    /// Engine errors by operation and error kind
    pub static ref LEDGER_ERRORS: CounterVec = CounterVec::new(
        Opts::new("mirror_ledger_errors_total", "Engine errors by kind"),
        &["operation", "kind"]
    ).expect("metric creation failed");

    // =========================================================================
    // STORE METRICS
    // =========================================================================

    /// Store scopes currently held by in-flight requests
    pub static ref ACTIVE_STORE_SCOPES: Gauge = Gauge::new(
        "mirror_store_active_scopes",
        "Deadline-bound store scopes currently open"
    ).expect("metric creation failed");

    /// Store calls cut off by their deadline
    pub static ref STORE_TIMEOUTS: Counter = Counter::new(
        "mirror_store_timeouts_total",
        "Store calls that exceeded their deadline"
    ).expect("metric creation failed");

    // =========================================================================
    // RECONSTRUCTION METRICS
    // =========================================================================

    /// Pages fetched by the batched transaction scan
    pub static ref SCAN_BATCHES: Counter = Counter::new(
        "mirror_scan_batches_total",
        "Transaction pages fetched by the batched scan"
    ).expect("metric creation failed");

    /// Pages that needed a disappearing-transfer correction
    pub static ref TRANSFER_CORRECTIONS: Counter = Counter::new(
        "mirror_scan_transfer_corrections_total",
        "Pages patched with historical token transfers"
    ).expect("metric creation failed");
}

static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

/// Register all metrics with the global registry. Safe to call repeatedly.
pub fn register_metrics() -> Result<(), TelemetryError> {
    REGISTERED
        .get_or_init(|| {
            let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
                Box::new(LEDGER_QUERIES.clone()),
                Box::new(LEDGER_QUERY_DURATION.clone()),
                Box::new(LEDGER_ERRORS.clone()),
                Box::new(ACTIVE_STORE_SCOPES.clone()),
                Box::new(STORE_TIMEOUTS.clone()),
                Box::new(SCAN_BATCHES.clone()),
                Box::new(TRANSFER_CORRECTIONS.clone()),
            ];

            for metric in metrics {
                REGISTRY.register(metric).map_err(|e| e.to_string())?;
            }
            Ok(())
        })
        .clone()
        .map_err(TelemetryError::MetricsInit)
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Records one engine query when dropped or finished.
pub struct QueryTimer {
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Record the outcome of the query, labelling errors by kind.
    pub fn finish(self, error_kind: Option<&str>) {
        let outcome = match error_kind {
            Some(kind) => {
                LEDGER_ERRORS
                    .with_label_values(&[self.operation, kind])
                    .inc();
                "error"
            }
            None => "ok",
        };
        LEDGER_QUERIES
            .with_label_values(&[self.operation, outcome])
            .inc();
        // Duration is observed by Drop.
    }
}

impl Drop for QueryTimer {
    fn drop(&mut self) {
        LEDGER_QUERY_DURATION
            .with_label_values(&[self.operation])
            .observe(self.start.elapsed().as_secs_f64());
    }
}
