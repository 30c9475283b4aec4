//! Cache and fetch metrics.
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! [`init_metrics`] installs the Prometheus recorder. Short-lived CLI runs
//! render the exposition text in-process instead of serving it.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const CACHE_HITS: &str = "track_awesome_cache_hits_total";
pub const CACHE_MISSES: &str = "track_awesome_cache_misses_total";
pub const CACHE_WRITES: &str = "track_awesome_cache_writes_total";
pub const CACHE_WRITE_BYTES: &str = "track_awesome_cache_write_bytes";
pub const CACHE_PRUNED: &str = "track_awesome_cache_pruned_total";
pub const FETCH_SUCCESS: &str = "track_awesome_fetch_success_total";
pub const FETCH_ERROR: &str = "track_awesome_fetch_error_total";
pub const FETCH_DURATION: &str = "track_awesome_fetch_duration_seconds";
pub const BATCHES_COMPLETED: &str = "track_awesome_limiter_batches_total";

/// Installs the Prometheus recorder. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
            describe_all();
            info!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Prometheus exposition text, if the recorder was installed.
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

fn describe_all() {
    ::metrics::describe_counter!(CACHE_HITS, "Fresh cache entries served");
    ::metrics::describe_counter!(CACHE_MISSES, "Reads that found no fresh cache entry");
    ::metrics::describe_counter!(CACHE_WRITES, "Cache entries written");
    ::metrics::describe_histogram!(CACHE_WRITE_BYTES, "Size of written cache entries");
    ::metrics::describe_counter!(CACHE_PRUNED, "Expired cache entry files removed");
    ::metrics::describe_counter!(FETCH_SUCCESS, "Network fetches with a success status");
    ::metrics::describe_counter!(FETCH_ERROR, "Network fetches that failed or timed out");
    ::metrics::describe_histogram!(FETCH_DURATION, "Wall time of network fetches");
    ::metrics::describe_counter!(BATCHES_COMPLETED, "Limiter batches that completed");
}

pub struct CacheMetrics;

impl CacheMetrics {
    pub fn record_hit() {
        ::metrics::counter!(CACHE_HITS).increment(1);
    }

    pub fn record_miss() {
        ::metrics::counter!(CACHE_MISSES).increment(1);
    }

    pub fn record_write(bytes: usize) {
        ::metrics::counter!(CACHE_WRITES).increment(1);
        ::metrics::histogram!(CACHE_WRITE_BYTES).record(bytes as f64);
    }

    pub fn record_pruned(files: usize) {
        if files > 0 {
            ::metrics::counter!(CACHE_PRUNED).increment(files as u64);
        }
    }
}

pub struct FetchMetrics;

impl FetchMetrics {
    pub fn record_success(duration_secs: f64) {
        ::metrics::counter!(FETCH_SUCCESS).increment(1);
        ::metrics::histogram!(FETCH_DURATION).record(duration_secs);
    }

    /// `kind` is `status`, `timeout` or `transport`.
    pub fn record_error(kind: &'static str) {
        ::metrics::counter!(FETCH_ERROR, "kind" => kind).increment(1);
    }
}

pub struct LimiterMetrics;

impl LimiterMetrics {
    pub fn record_batch() {
        ::metrics::counter!(BATCHES_COMPLETED).increment(1);
    }
}
