use crate::domain::payment::{ErrorEnvelope, ErrorPayload};
use crate::error::ActivationError;
use axum::http::StatusCode;

pub fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
    }
}

pub fn status_for(e: &ActivationError) -> StatusCode {
    match e {
        ActivationError::Validation(_) => StatusCode::BAD_REQUEST,
        ActivationError::Auth(_) | ActivationError::Submission(_) | ActivationError::StatusQuery(_) => {
            StatusCode::BAD_GATEWAY
        }
        ActivationError::Configuration(_) | ActivationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn to_envelope(e: &ActivationError) -> (StatusCode, ErrorEnvelope) {
    let mut envelope = err(e.code(), &e.to_string());
    envelope.error.details = e.upstream().map(ToString::to_string);
    (status_for(e), envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;

    #[test]
    fn validation_maps_to_bad_request() {
        let (status, body) = to_envelope(&ActivationError::Validation("amount must be > 0".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "VALIDATION_ERROR");
        assert!(body.error.details.is_none());
    }

    #[test]
    fn gateway_rejection_maps_to_bad_gateway_with_details() {
        let (status, body) = to_envelope(&ActivationError::Submission(GatewayError::Rejected {
            status: 400,
            body: "invalid currency".to_string(),
        }));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.error.details.unwrap().contains("invalid currency"));
    }
}
