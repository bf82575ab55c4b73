pub mod metrics;
pub mod tracing;

use std::sync::Arc;

use prometheus::{Encoder, Registry, TextEncoder};

use self::metrics::Metrics;

/// Owns the Prometheus registry and the service metrics.
#[derive(Debug, Clone)]
pub struct Telemetry {
    registry: Arc<Registry>,
    metrics: Arc<Metrics>,
}

impl Telemetry {
    /// # Errors
    /// Returns an error when the metrics cannot be registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Arc::new(Registry::new());
        let metrics = Arc::new(Metrics::new(&registry)?);
        Ok(Self { registry, metrics })
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn record_ready_probe(&self, ready: bool) {
        ::tracing::debug!(ready, "readiness probe");
    }

    pub fn record_live_probe(&self) {
        ::tracing::debug!("liveness probe");
    }

    /// Renders this registry in the Prometheus text format.
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
            ::tracing::warn!(error = %err, "failed to encode metrics");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
