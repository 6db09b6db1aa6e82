use crate::AppState;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use std::collections::HashMap;

pub async fn receive(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    match state.notification_handler.handle(&params).await {
        Ok(ack) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            ack.body().to_string(),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("error processing payment notification: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                "Error processing IPN".to_string(),
            )
                .into_response()
        }
    }
}
