//! Run metrics for the place-name pipeline
//!
//! Counters and histograms are emitted through the `metrics` facade. Nothing is
//! recorded unless a recorder is installed, which `init_metrics` does when
//! `TEI_METRICS_ADDR` is set.

use std::net::SocketAddr;
use std::sync::Once;
use tracing::{info, warn};

pub const METRICS_ADDR_ENV: &str = "TEI_METRICS_ADDR";

static INIT: Once = Once::new();

/// Install a Prometheus exporter if `TEI_METRICS_ADDR` names a socket address.
///
/// Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| {
        let Ok(addr_str) = std::env::var(METRICS_ADDR_ENV) else {
            return;
        };
        let addr = match addr_str.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(e) => {
                warn!("Invalid {} '{}': {}", METRICS_ADDR_ENV, addr_str, e);
                return;
            }
        };
        match metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
        {
            Ok(()) => {
                info!("Prometheus exporter listening at http://{}/metrics", addr);
                PipelineMetrics::register_metrics();
            }
            Err(e) => warn!("Failed to install Prometheus exporter: {}", e),
        }
    });
}

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_document_read() {
        ::metrics::counter!("tei_documents_read_total").increment(1);
    }

    pub fn record_document_failed(kind: &'static str) {
        ::metrics::counter!("tei_documents_failed_total", "kind" => kind).increment(1);
    }

    pub fn record_references_extracted(count: usize) {
        ::metrics::counter!("tei_references_extracted_total").increment(count as u64);
    }

    pub fn record_lookup_success(duration_secs: f64) {
        ::metrics::counter!("tei_lookups_success_total").increment(1);
        ::metrics::histogram!("tei_lookup_duration_seconds").record(duration_secs);
    }

    pub fn record_lookup_error(kind: &'static str) {
        ::metrics::counter!("tei_lookups_error_total", "kind" => kind).increment(1);
    }

    pub fn record_cache_hit() {
        ::metrics::counter!("tei_lookup_cache_hits_total").increment(1);
    }

    pub fn record_rows_written(count: usize) {
        ::metrics::counter!("tei_rows_written_total").increment(count as u64);
    }

    /// Pre-register so the exporter lists every series before first use.
    fn register_metrics() {
        let _ = ::metrics::counter!("tei_documents_read_total");
        let _ = ::metrics::counter!("tei_references_extracted_total");
        let _ = ::metrics::counter!("tei_lookups_success_total");
        let _ = ::metrics::counter!("tei_lookup_cache_hits_total");
        let _ = ::metrics::counter!("tei_rows_written_total");
        let _ = ::metrics::histogram!("tei_lookup_duration_seconds");
    }
}
