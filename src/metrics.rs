//! Write-path counters, exported in Prometheus text format on `/metrics`
//! when enabled.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    EntityWrites,
    EntityWriteFailures,
    ValidationRejects,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::EntityWrites => "fyuur_entity_writes_total",
            MetricName::EntityWriteFailures => "fyuur_entity_write_failures_total",
            MetricName::ValidationRejects => "fyuur_validation_rejects_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the Prometheus recorder. Idempotent; returns the render handle.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = HANDLE.get() {
        return Some(handle.clone());
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus recorder installed, serving /metrics");
            Some(HANDLE.get_or_init(|| handle).clone())
        }
        Err(e) => {
            warn!("Prometheus recorder install failed (possibly already installed): {}", e);
            None
        }
    }
}

pub fn record(name: MetricName, entity: &'static str, operation: &'static str) {
    ::metrics::counter!(name.as_str(), "entity" => entity, "operation" => operation).increment(1);
}
