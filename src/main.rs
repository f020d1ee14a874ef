use advisor_backend::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    routes,
    services::{
        aggregation_service::FeedbackAggregator,
        feedback_store::{FeedbackStore, PgFeedbackStore},
        webhook_verifier::WebhookVerifier,
    },
    AppState,
};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config().context("configuration not initialized")?;
    init_tracing(config.log_json);

    let verifier = WebhookVerifier::new(&config.webhook_secret)?;

    let feedback_store: Option<Arc<dyn FeedbackStore>> = match &config.database {
        Some(db) => {
            let pool = create_pool(db).await?;
            run_migrations(&pool).await?;
            info!(database = db.name.as_deref().unwrap_or("<from url>"), "feedback store connected");
            let store: Arc<dyn FeedbackStore> = Arc::new(PgFeedbackStore::new(pool));
            Some(store)
        }
        None => {
            warn!("DATABASE_URL not set; feedback aggregation and feedback API are disabled");
            None
        }
    };

    let aggregator = FeedbackAggregator::new(
        feedback_store.clone(),
        config.aggregation_interval,
        config.store_timeout,
    );
    tokio::spawn(aggregator.run());

    let app_state = AppState::new(verifier, feedback_store);
    let app = routes::router(app_state, config.feedback_rps);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
