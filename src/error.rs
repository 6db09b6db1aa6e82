use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("malformed gateway response: {0}")]
    Malformed(String),
    #[error("gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("gateway authentication failed: {0}")]
    Auth(#[source] GatewayError),
    #[error("invalid order: {0}")]
    Validation(String),
    #[error("gateway rejected order: {0}")]
    Submission(#[source] GatewayError),
    #[error("transaction status query failed: {0}")]
    StatusQuery(#[source] GatewayError),
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl ActivationError {
    pub fn code(&self) -> &'static str {
        match self {
            ActivationError::Configuration(_) => "CONFIGURATION_ERROR",
            ActivationError::Auth(_) => "GATEWAY_AUTH_FAILED",
            ActivationError::Validation(_) => "VALIDATION_ERROR",
            ActivationError::Submission(_) => "GATEWAY_REJECTED_ORDER",
            ActivationError::StatusQuery(_) => "GATEWAY_STATUS_UNAVAILABLE",
            ActivationError::Store(_) => "STORE_ERROR",
        }
    }

    /// Upstream diagnostics carried by gateway failures.
    pub fn upstream(&self) -> Option<&GatewayError> {
        match self {
            ActivationError::Auth(e) | ActivationError::Submission(e) | ActivationError::StatusQuery(e) => {
                Some(e)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_carries_upstream_status_and_body() {
        let err = ActivationError::Auth(GatewayError::Rejected {
            status: 401,
            body: "invalid consumer key".to_string(),
        });
        assert_eq!(err.code(), "GATEWAY_AUTH_FAILED");
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid consumer key"));
        assert!(matches!(err.upstream(), Some(GatewayError::Rejected { status: 401, .. })));
    }

    #[test]
    fn store_error_wraps_anyhow() {
        let err: ActivationError = anyhow::anyhow!("connection reset").into();
        assert_eq!(err.code(), "STORE_ERROR");
        assert!(err.upstream().is_none());
    }
}
