use crate::http::errors::to_envelope;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Re-derives a payment's outcome from the gateway on operator request. A
/// payment the gateway has not settled is reported and left pending.
pub async fn recheck_payment(
    State(state): State<AppState>,
    Path(tracking_id): Path<String>,
) -> impl IntoResponse {
    tracing::info!(%tracking_id, "manual payment recheck requested");
    match state.notification_handler.reconcile_if_final(&tracking_id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "tracking_id": tracking_id,
                "result": result.as_ref().map_or("still_pending", |r| r.label()),
            })),
        )
            .into_response(),
        Err(e) => {
            let (status, body) = to_envelope(&e);
            (status, Json(body)).into_response()
        }
    }
}
