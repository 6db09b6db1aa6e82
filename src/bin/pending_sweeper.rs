use activation_payments::config::{AppConfig, GatewayCredentials};
use activation_payments::gateways;
use activation_payments::repo::balances_repo::BalancesRepo;
use activation_payments::repo::payments_repo::PaymentsRepo;
use activation_payments::service::order_submitter::OrderSettings;
use activation_payments::service::sweeper::sweep_pending;
use activation_payments::AppState;
use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const BATCH_SIZE: i64 = 100;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let credentials = GatewayCredentials::for_config(&cfg)?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cfg.database_url)
        .await?;

    let payments = Arc::new(PaymentsRepo { pool: pool.clone() });
    let state = AppState::new(
        gateways::from_config(&cfg),
        credentials,
        payments.clone(),
        Arc::new(BalancesRepo { pool }),
        OrderSettings {
            currency: cfg.currency.clone(),
            description: cfg.activation_description.clone(),
            callback_url: cfg.callback_url(),
            notification_id: cfg.ipn_id.clone(),
        },
    );

    let cutoff = chrono::Utc::now() - chrono::Duration::minutes(cfg.sweep_min_age_minutes);
    let report = sweep_pending(payments.as_ref(), &state.notification_handler, cutoff, BATCH_SIZE).await?;
    tracing::info!(
        scanned = report.scanned,
        resolved = report.resolved,
        still_pending = report.still_pending,
        errors = report.errors,
        "pending sweep finished"
    );
    Ok(())
}
