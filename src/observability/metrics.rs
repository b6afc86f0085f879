//! Metrics collection and exposition.
//!
//! # Metrics
//! - `blog_dispatch_total` (counter): dispatched requests by view
//! - `blog_unhandled_paths_total` (counter): route paths matching no rule
//! - `blog_resolve_failures_total` (counter): resolver failures by reason
//! - `blog_comments_created_total` (counter): accepted comment submissions
//! - `blog_request_duration_seconds` (histogram): view latency by view

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one rendered view; `view` is a [`crate::routing::ViewKind`] label or `home`.
pub fn record_dispatch(view: &'static str, start: Instant) {
    ::metrics::counter!("blog_dispatch_total", "view" => view).increment(1);
    ::metrics::histogram!("blog_request_duration_seconds", "view" => view)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_unhandled() {
    ::metrics::counter!("blog_unhandled_paths_total").increment(1);
}

pub fn record_resolve_failure(reason: &'static str) {
    ::metrics::counter!("blog_resolve_failures_total", "reason" => reason).increment(1);
}

pub fn record_comment_created() {
    ::metrics::counter!("blog_comments_created_total").increment(1);
}
