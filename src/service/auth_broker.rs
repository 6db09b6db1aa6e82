use crate::config::GatewayCredentials;
use crate::error::ActivationError;
use crate::gateways::{GatewayToken, PaymentGateway};
use std::sync::Arc;

/// Exchanges the static service credentials for a bearer token. One request
/// per call, no retries and no caching; callers decide what a failure means.
#[derive(Clone)]
pub struct AuthBroker {
    pub gateway: Arc<dyn PaymentGateway>,
    pub credentials: GatewayCredentials,
}

impl AuthBroker {
    pub async fn obtain_token(&self) -> Result<GatewayToken, ActivationError> {
        match self.gateway.request_token(&self.credentials).await {
            Ok(token) => {
                tracing::debug!("obtained {} token", self.gateway.name());
                Ok(token)
            }
            Err(e) => {
                tracing::warn!("{} token request failed: {}", self.gateway.name(), e);
                Err(ActivationError::Auth(e))
            }
        }
    }
}
