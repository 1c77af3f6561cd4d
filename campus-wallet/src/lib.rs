use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod clients;
pub mod config;
pub mod events;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

use campus_shared::clients::events::EventSink;
use clients::wallet_api::WalletApiClient;
use config::AppConfig;
use store::SavingsStore;

pub struct AppState {
    pub store: Arc<dyn SavingsStore>,
    pub events: Arc<dyn EventSink>,
    pub wallet_api: WalletApiClient,
    pub config: AppConfig,
    pub metrics_handle: PrometheusHandle,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Local ledger
        .route("/wallet", post(routes::wallet::open_wallet))
        .route("/wallet/balance", get(routes::wallet::get_balance))
        .route("/wallet/transactions", get(routes::wallet::list_transactions))
        .route("/admin/wallets/:user_id/credit", post(routes::wallet::credit_wallet))
        .route("/savings/goals", get(routes::savings::list_goals).post(routes::savings::create_goal))
        .route("/savings/goals/:id/deposit", post(routes::savings::deposit))
        .route("/savings/goals/:id/withdraw", post(routes::savings::withdraw))
        // External Wallet API
        .route("/wallet/remote/balance", get(routes::remote::balance))
        .route("/wallet/remote/transactions", get(routes::remote::transactions))
        .route("/wallet/remote/profile", get(routes::remote::profile))
        .route("/wallet/remote/register", post(routes::remote::register))
        .route(
            "/wallet/remote/documents",
            post(routes::remote::upload_document).layer(DefaultBodyLimit::max(routes::remote::MAX_DOCUMENT_BYTES)),
        )
        .route("/wallet/remote/vouchers", post(routes::remote::purchase_voucher))
        .layer(axum::middleware::from_fn(campus_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
