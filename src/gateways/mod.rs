use crate::config::{AppConfig, GatewayCredentials};
use crate::domain::payment::BillingInfo;
use crate::error::GatewayError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod mock;
pub mod pesapal;

/// Short-lived bearer credential. Never cached: each flow step asks for its own.
#[derive(Clone, Deserialize)]
pub struct GatewayToken {
    pub token: String,
    #[serde(default, rename = "expiryDate")]
    pub expiry_date: Option<String>,
}

impl std::fmt::Debug for GatewayToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayToken")
            .field("token", &"<redacted>")
            .field("expiry_date", &self.expiry_date)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub id: String,
    pub currency: String,
    pub amount: Decimal,
    pub description: String,
    pub callback_url: String,
    pub notification_id: String,
    pub billing: BillingInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAccepted {
    pub redirect_url: String,
    #[serde(default)]
    pub order_tracking_id: Option<String>,
    #[serde(default)]
    pub merchant_reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatus {
    #[serde(default)]
    pub payment_status_description: Option<String>,
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub confirmation_code: Option<String>,
    #[serde(default)]
    pub merchant_reference: Option<String>,
}

const FINAL_DESCRIPTIONS: [&str; 3] = ["completed", "failed", "reversed"];

impl TransactionStatus {
    /// Whether the gateway has settled the payment. `INVALID` is also what an
    /// unfinished checkout reports, so it is not final. Judged on the
    /// description alone since that is what the outcome mapping reads.
    pub fn is_final(&self) -> bool {
        self.payment_status_description
            .as_deref()
            .is_some_and(|d| FINAL_DESCRIPTIONS.iter().any(|f| d.eq_ignore_ascii_case(f)))
    }
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn request_token(&self, credentials: &GatewayCredentials) -> Result<GatewayToken, GatewayError>;

    async fn submit_order(
        &self,
        token: &GatewayToken,
        order: &OrderRequest,
    ) -> Result<OrderAccepted, GatewayError>;

    async fn transaction_status(
        &self,
        token: &GatewayToken,
        tracking_id: &str,
    ) -> Result<TransactionStatus, GatewayError>;
}

/// Picks the adapter named by `GATEWAY_MODE`.
pub fn from_config(cfg: &AppConfig) -> Arc<dyn PaymentGateway> {
    if cfg.uses_mock_gateway() {
        tracing::warn!("GATEWAY_MODE=mock: payments are simulated in process");
        return Arc::new(mock::MockGateway::default());
    }
    Arc::new(pesapal::PesapalGateway {
        base_url: cfg.gateway_base_url.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client: reqwest::Client::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(description: Option<&str>, code: Option<i64>) -> TransactionStatus {
        TransactionStatus {
            payment_status_description: description.map(str::to_string),
            status_code: code,
            confirmation_code: None,
            merchant_reference: None,
        }
    }

    #[test]
    fn settled_descriptions_are_final() {
        assert!(status(Some("Completed"), Some(1)).is_final());
        assert!(status(Some("FAILED"), Some(2)).is_final());
        assert!(status(Some("Reversed"), Some(3)).is_final());
    }

    #[test]
    fn in_progress_or_missing_status_is_not_final() {
        assert!(!status(Some("INVALID"), Some(0)).is_final());
        assert!(!status(None, Some(1)).is_final());
        assert!(!status(Some(" Completed"), None).is_final());
    }
}
