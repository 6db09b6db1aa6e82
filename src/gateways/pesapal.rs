use crate::config::GatewayCredentials;
use crate::error::GatewayError;
use crate::gateways::{GatewayToken, OrderAccepted, OrderRequest, PaymentGateway, TransactionStatus};
use rust_decimal::prelude::ToPrimitive;
use serde::de::DeserializeOwned;
use serde_json::json;

const BODY_PREVIEW_CHARS: usize = 500;
const FALLBACK_PHONE: &str = "0700000000";

pub struct PesapalGateway {
    pub base_url: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

impl PesapalGateway {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for PesapalGateway {
    fn name(&self) -> &'static str {
        "pesapal"
    }

    async fn request_token(&self, credentials: &GatewayCredentials) -> Result<GatewayToken, GatewayError> {
        let body = json!({
            "consumer_key": credentials.consumer_key,
            "consumer_secret": credentials.consumer_secret,
        });

        let resp = self
            .client
            .post(self.url("api/Auth/RequestToken"))
            .header("Accept", "application/json")
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await?;

        let token: GatewayToken = read_json(resp).await?;
        if token.token.trim().is_empty() {
            return Err(GatewayError::Malformed("auth response carried an empty token".to_string()));
        }
        Ok(token)
    }

    async fn submit_order(
        &self,
        token: &GatewayToken,
        order: &OrderRequest,
    ) -> Result<OrderAccepted, GatewayError> {
        let body = order_body(order)?;

        let resp = self
            .client
            .post(self.url("api/Transactions/SubmitOrderRequest"))
            .bearer_auth(&token.token)
            .header("Accept", "application/json")
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await?;

        read_json(resp).await
    }

    async fn transaction_status(
        &self,
        token: &GatewayToken,
        tracking_id: &str,
    ) -> Result<TransactionStatus, GatewayError> {
        let resp = self
            .client
            .get(self.url("api/Transactions/GetTransactionStatus"))
            .query(&[("orderTrackingId", tracking_id)])
            .bearer_auth(&token.token)
            .header("Accept", "application/json")
            .timeout(self.timeout())
            .send()
            .await?;

        read_json(resp).await
    }
}

fn order_body(order: &OrderRequest) -> Result<serde_json::Value, GatewayError> {
    let amount = order
        .amount
        .to_f64()
        .ok_or_else(|| GatewayError::Malformed(format!("amount {} is not representable", order.amount)))?;

    Ok(json!({
        "id": order.id,
        "currency": order.currency,
        "amount": amount,
        "description": order.description,
        "callback_url": order.callback_url,
        "notification_id": order.notification_id,
        "billing_address": {
            "email_address": order.billing.email,
            "phone_number": order.billing.phone_number.as_deref().unwrap_or(FALLBACK_PHONE),
            "first_name": order.billing.first_name,
            "last_name": order.billing.last_name,
        }
    }))
}

/// Non-2xx responses and 2xx bodies whose `error` object carries content are
/// both rejections; anything that does not parse into `T` is malformed.
///
/// Successful replies still include an `error` object with every field null,
/// so its mere presence means nothing.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, GatewayError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(GatewayError::Rejected {
            status: status.as_u16(),
            body: preview(&text),
        });
    }

    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| GatewayError::Malformed(format!("{e}: {}", preview(&text))))?;

    let upstream_status = value
        .get("status")
        .and_then(|s| {
            s.as_str()
                .and_then(|s| s.trim().parse::<u16>().ok())
                .or_else(|| s.as_u64().and_then(|n| u16::try_from(n).ok()))
        });

    if value.get("error").is_some_and(carries_content) || upstream_status.is_some_and(|s| !(200..300).contains(&s)) {
        let upstream_status = upstream_status.unwrap_or(status.as_u16());
        return Err(GatewayError::Rejected {
            status: upstream_status,
            body: preview(&text),
        });
    }

    serde_json::from_value(value).map_err(|e| GatewayError::Malformed(format!("{e}: {}", preview(&text))))
}

fn carries_content(error: &serde_json::Value) -> bool {
    match error {
        serde_json::Value::Null => false,
        serde_json::Value::String(s) => !s.trim().is_empty(),
        serde_json::Value::Object(fields) => ["error_type", "code", "message"]
            .iter()
            .any(|k| fields.get(*k).is_some_and(carries_content)),
        _ => true,
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
