use anyhow::Result;
use metrics::{counter, histogram, NoopRecorder};
use std::time::Duration;

/// Metric name registry for the operational counters.
///
/// Names only; recording goes through the global `metrics` recorder, which
/// stays a no-op unless the embedding application installs a real exporter.
#[derive(Debug, Clone, Copy)]
pub struct OpsMetrics {
    /// Counter: store reads, labeled by table
    pub store_reads_total: &'static str,
    /// Counter: store writes, labeled by operation and table
    pub store_writes_total: &'static str,
    /// Counter: cache hits, labeled by table
    pub cache_hits_total: &'static str,
    /// Counter: booking requests resolved, labeled by outcome
    pub requests_resolved_total: &'static str,
    /// Histogram: store call duration in seconds
    pub store_call_duration: &'static str,
    /// Counter: errors, labeled by type
    pub errors_total: &'static str,
}

impl Default for OpsMetrics {
    fn default() -> Self {
        Self {
            store_reads_total: "salon_ops_store_reads_total",
            store_writes_total: "salon_ops_store_writes_total",
            cache_hits_total: "salon_ops_cache_hits_total",
            requests_resolved_total: "salon_ops_requests_resolved_total",
            store_call_duration: "salon_ops_store_call_duration_seconds",
            errors_total: "salon_ops_errors_total",
        }
    }
}

impl OpsMetrics {
    /// Install the no-op global recorder. Fails if a recorder is already set.
    pub fn init() -> Result<()> {
        metrics::set_global_recorder(NoopRecorder)
            .map_err(|_| anyhow::anyhow!("metrics recorder already installed"))?;
        Ok(())
    }

    /// Record a full-table read against the backing store.
    pub fn record_store_read(&self, table: &str, duration: Duration) {
        counter!(self.store_reads_total, "table" => table.to_string()).increment(1);
        histogram!(self.store_call_duration, "op" => "read").record(duration.as_secs_f64());
    }

    /// Record a cached read that never reached the store.
    pub fn record_cache_hit(&self, table: &str) {
        counter!(self.cache_hits_total, "table" => table.to_string()).increment(1);
    }

    /// Record a write (append, update or delete) against the backing store.
    pub fn record_store_write(&self, operation: &'static str, table: &str) {
        counter!(self.store_writes_total, "op" => operation, "table" => table.to_string())
            .increment(1);
    }

    /// Record a booking request reaching a terminal state.
    pub fn record_request_resolution(&self, outcome: &'static str) {
        counter!(self.requests_resolved_total, "outcome" => outcome).increment(1);
    }

    /// Record an error by coarse type.
    pub fn record_error(&self, error_type: &'static str) {
        counter!(self.errors_total, "type" => error_type).increment(1);
    }
}
