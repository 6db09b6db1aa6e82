use crate::http::handlers::{activation, admin, ipn, ops};
use crate::http::middleware::{admin_auth, rate_limit};
use crate::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

pub fn build_router(state: AppState, admin_key: String, order_rate_limit: Option<rate_limit::RateLimitState>) -> Router {
    let admin_routes = Router::new()
        .route("/admin/payments/:tracking_id/recheck", post(admin::recheck_payment))
        .layer(from_fn_with_state(admin_key, admin_auth::require_internal_api_key));

    let mut order_routes = Router::new().route("/activation/orders", post(activation::submit_order));
    if let Some(limit) = order_rate_limit {
        order_routes = order_routes.layer(from_fn_with_state(limit, rate_limit::enforce));
    }

    Router::new()
        .route("/health", get(ops::health))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .route("/activation/orders/:order_id", get(activation::get_order))
        .route("/ipn", get(ipn::receive).post(ipn::receive))
        .merge(order_routes)
        .merge(admin_routes)
        .with_state(state)
}
