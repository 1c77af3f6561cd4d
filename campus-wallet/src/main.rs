use std::sync::Arc;

use campus_shared::clients::db::create_pool;
use campus_shared::clients::events::{EventSink, NoopSink};
use campus_shared::clients::rabbitmq::RabbitMQClient;
use campus_wallet::clients::wallet_api::WalletApiClient;
use campus_wallet::config::AppConfig;
use campus_wallet::store::PgSavingsStore;
use campus_wallet::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    campus_shared::middleware::init_tracing("campus-wallet");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url)?;
    let metrics_handle = campus_shared::middleware::init_metrics()?;

    let events: Arc<dyn EventSink> = if config.rabbitmq_url.is_empty() {
        tracing::warn!("rabbitmq_url is empty, domain events will be dropped");
        Arc::new(NoopSink)
    } else {
        Arc::new(RabbitMQClient::connect(&config.rabbitmq_url, "campus-wallet").await?)
    };

    let wallet_api = WalletApiClient::new(&config.wallet_api_url, config.wallet_api_timeout())?;
    tracing::info!(url = %config.wallet_api_url, "wallet api client ready");

    let state = Arc::new(AppState {
        store: Arc::new(PgSavingsStore::new(db)),
        events,
        wallet_api,
        config,
        metrics_handle,
    });

    let app = campus_wallet::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "campus-wallet starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
