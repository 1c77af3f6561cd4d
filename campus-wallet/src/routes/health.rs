use axum::extract::State;
use std::sync::Arc;

use campus_shared::{HealthCheck, HealthResponse};

use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> HealthResponse {
    let events_ready = if state.events.is_ready() {
        Ok(())
    } else {
        Err("event broker channel closed")
    };
    let checks = vec![
        HealthCheck::from_result("database", state.store.ping()),
        HealthCheck::from_result("events", events_ready),
    ];

    HealthResponse::healthy("campus-wallet", env!("CARGO_PKG_VERSION")).with_checks(checks)
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn health_reports_service() {
        let app = TestApp::new();
        let (status, body) = app.request(Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "campus-wallet");
        assert_eq!(body["checks"][1]["name"], "events");
    }
}
