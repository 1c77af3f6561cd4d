use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const REQUESTS: &str = "http_requests_total";
const LATENCY: &str = "http_request_duration_seconds";

/// Upper bounds tuned for a CRUD API backed by one Postgres round trip.
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0];

/// Requests that hit no route share this label.
const UNMATCHED: &str = "unmatched";

pub async fn metrics_middleware(matched_path: Option<MatchedPath>, req: Request<Body>, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let route = matched_path.map_or_else(|| UNMATCHED.to_owned(), |p| p.as_str().to_owned());
    let started = Instant::now();

    let response = next.run(req).await;

    let elapsed = started.elapsed().as_secs_f64();
    let labels = [("method", method), ("path", route), ("status", response.status().as_u16().to_string())];
    counter!(REQUESTS, &labels).increment(1);
    histogram!(LATENCY, &labels).record(elapsed);

    response
}

/// Registers help text for the HTTP series and the domain counters.
pub fn describe_metrics() {
    describe_counter!(REQUESTS, "HTTP requests served, by route and status");
    describe_histogram!(LATENCY, Unit::Seconds, "HTTP request latency");
    describe_counter!("dating_swipes_total", "Swipes recorded, by decision");
    describe_counter!("dating_matches_total", "Mutual matches created");
    describe_counter!("savings_deposits_total", "Deposits moved from wallet into a savings goal");
}

fn builder() -> anyhow::Result<PrometheusBuilder> {
    Ok(PrometheusBuilder::new().set_buckets_for_metric(Matcher::Full(LATENCY.to_string()), LATENCY_BUCKETS)?)
}

/// Installs the process-wide Prometheus recorder. Call once, at startup.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = builder()?.install_recorder()?;
    describe_metrics();
    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally.
pub fn detached_metrics_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
