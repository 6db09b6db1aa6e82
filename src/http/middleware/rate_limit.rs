use crate::http::errors::err;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use redis::AsyncCommands;

/// Fixed one-minute window per client IP, counted in Redis. When Redis is
/// unreachable requests pass through.
#[derive(Clone)]
pub struct RateLimitState {
    pub redis_client: redis::Client,
    pub scope: &'static str,
    pub max_per_minute: i64,
}

pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

pub fn window_key(scope: &str, ip: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    format!("rate:{}:{}:{}", scope, ip, now.format("%Y%m%d%H%M"))
}

pub async fn enforce(
    State(state): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(request.headers());
    let key = window_key(state.scope, &ip, chrono::Utc::now());

    match state.redis_client.get_multiplexed_async_connection().await {
        Ok(mut conn) => {
            let count: i64 = conn.incr(&key, 1).await.unwrap_or(1);
            let _: bool = conn.expire(&key, 120).await.unwrap_or(false);
            if count > state.max_per_minute {
                tracing::warn!(%ip, scope = state.scope, "rate limit exceeded");
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(err("RATE_LIMITED", "too many activation attempts, try again shortly")),
                )
                    .into_response();
            }
        }
        Err(e) => tracing::debug!("rate limiter skipped, redis unavailable: {}", e),
    }

    next.run(request).await
}
