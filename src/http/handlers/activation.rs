use crate::domain::payment::{SubmitActivationRequest, SubmitActivationResponse};
use crate::http::errors::{err, to_envelope};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "user-id";

pub async fn submit_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitActivationRequest>,
) -> impl IntoResponse {
    let user_id = match headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
    {
        Some(id) => id,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(err("MISSING_USER_ID", "user-id header must carry the account id")),
            )
                .into_response()
        }
    };

    match state
        .order_submitter
        .submit_activation_order(user_id, req.amount, req.billing_info())
        .await
    {
        Ok(order) => (StatusCode::OK, Json(SubmitActivationResponse::from(order))).into_response(),
        Err(e) => {
            let (status, body) = to_envelope(&e);
            (status, Json(body)).into_response()
        }
    }
}

pub async fn get_order(State(state): State<AppState>, Path(order_id): Path<String>) -> impl IntoResponse {
    match state.payments.find_by_order_id(&order_id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(err("PAYMENT_NOT_FOUND", "no activation payment for this order id")),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(err("STORE_ERROR", &e.to_string())),
        )
            .into_response(),
    }
}
