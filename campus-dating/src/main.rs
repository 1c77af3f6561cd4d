use std::sync::Arc;

use campus_dating::config::AppConfig;
use campus_dating::store::PgDatingStore;
use campus_dating::AppState;
use campus_shared::clients::db::create_pool;
use campus_shared::clients::events::{EventSink, NoopSink};
use campus_shared::clients::rabbitmq::RabbitMQClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    campus_shared::middleware::init_tracing("campus-dating");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url)?;
    let metrics_handle = campus_shared::middleware::init_metrics()?;

    let events: Arc<dyn EventSink> = if config.rabbitmq_url.is_empty() {
        tracing::warn!("rabbitmq_url is empty, domain events will be dropped");
        Arc::new(NoopSink)
    } else {
        Arc::new(RabbitMQClient::connect(&config.rabbitmq_url, "campus-dating").await?)
    };

    let state = Arc::new(AppState {
        store: Arc::new(PgDatingStore::new(db)),
        events,
        config,
        metrics_handle,
    });

    let app = campus_dating::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "campus-dating starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
