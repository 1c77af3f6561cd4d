use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod events;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

use campus_shared::clients::events::EventSink;
use config::AppConfig;
use store::DatingStore;

pub struct AppState {
    pub store: Arc<dyn DatingStore>,
    pub events: Arc<dyn EventSink>,
    pub config: AppConfig,
    pub metrics_handle: PrometheusHandle,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/profile", get(routes::profile::get_own_profile).put(routes::profile::upsert_profile))
        .route("/profiles/:user_id", get(routes::profile::get_profile))
        .route("/feed", get(routes::feed::get_feed))
        .route("/swipes", post(routes::swipes::create_swipe))
        .route("/swipes/count", get(routes::swipes::swipe_count))
        .route("/matches", get(routes::matches::list_matches))
        .route("/matches/check/:user_id", get(routes::matches::check_match))
        .layer(axum::middleware::from_fn(campus_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
