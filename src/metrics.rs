/// Counter sink used by the background maintenance tasks.
pub trait MetricsSink: Send + Sync {
    fn increment(&self, counter: &str);
}

/// Emits one `tracing` debug event per increment.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn increment(&self, counter: &str) {
        tracing::debug!(counter, "metric incremented");
    }
}
