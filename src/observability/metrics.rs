//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define index metrics (requests, latency, upstream failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `simpleindex_requests_total` (counter): requests by route key, kind, status
//! - `simpleindex_request_duration_seconds` (histogram): latency by route key, kind
//! - `simpleindex_upstream_failures_total` (counter): outbound calls that got no usable
//!   answer, by reason (`timeout`, `transport`, `body`)
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels use the configured route key, never the raw request path

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one resolved request.
pub fn record_request(route: &str, kind: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "simpleindex_requests_total",
        "route" => route.to_string(),
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "simpleindex_request_duration_seconds",
        "route" => route.to_string(),
        "kind" => kind
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record an outbound call that failed before a complete upstream answer.
pub fn record_upstream_failure(reason: &'static str) {
    ::metrics::counter!("simpleindex_upstream_failures_total", "reason" => reason).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::sync::Mutex;

    /// Remembers the names of registered counters.
    #[derive(Default)]
    struct CounterNames(Mutex<Vec<String>>);

    impl Recorder for CounterNames {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            self.0.lock().unwrap().push(key.name().to_string());
            Counter::noop()
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn test_relayed_gateway_status_is_not_an_upstream_failure() {
        let recorder = CounterNames::default();
        ::metrics::with_local_recorder(&recorder, || {
            record_request("mirror", "page", 502, Instant::now());
            record_request("mirror", "page", 504, Instant::now());
        });
        let names = recorder.0.lock().unwrap().clone();
        assert!(names.iter().all(|name| name == "simpleindex_requests_total"), "{names:?}");
    }

    #[test]
    fn test_upstream_failure_counter() {
        let recorder = CounterNames::default();
        ::metrics::with_local_recorder(&recorder, || record_upstream_failure("timeout"));
        let names = recorder.0.lock().unwrap().clone();
        assert_eq!(names, vec!["simpleindex_upstream_failures_total".to_string()]);
    }
}
