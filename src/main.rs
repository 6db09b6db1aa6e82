use activation_payments::config::{AppConfig, GatewayCredentials};
use activation_payments::gateways;
use activation_payments::http::middleware::rate_limit::RateLimitState;
use activation_payments::http::router::build_router;
use activation_payments::repo::balances_repo::BalancesRepo;
use activation_payments::repo::payments_repo::PaymentsRepo;
use activation_payments::service::order_submitter::OrderSettings;
use activation_payments::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let credentials = GatewayCredentials::for_config(&cfg)?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let payments = Arc::new(PaymentsRepo { pool: pool.clone() });
    let balances = Arc::new(BalancesRepo { pool });
    let gateway = gateways::from_config(&cfg);

    let settings = OrderSettings {
        currency: cfg.currency.clone(),
        description: cfg.activation_description.clone(),
        callback_url: cfg.callback_url(),
        notification_id: cfg.ipn_id.clone(),
    };

    let mut state = AppState::new(gateway, credentials, payments, balances, settings);
    state.redis_client = Some(redis::Client::open(cfg.redis_url.clone())?);

    let order_rate_limit = RateLimitState {
        redis_client: redis::Client::open(cfg.redis_url.clone())?,
        scope: "activation-orders",
        max_per_minute: cfg.order_rate_limit_per_minute,
    };

    let app = build_router(state, cfg.internal_api_key.clone(), Some(order_rate_limit));

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
