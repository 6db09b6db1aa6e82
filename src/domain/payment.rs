use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Two-valued result of an authoritative status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// The only forward transition: `pending` moves to the outcome's terminal
    /// status. Terminal statuses never move again.
    pub fn advance(self, outcome: PaymentOutcome) -> Option<PaymentStatus> {
        match self {
            PaymentStatus::Pending => Some(match outcome {
                PaymentOutcome::Completed => PaymentStatus::Completed,
                PaymentOutcome::Failed => PaymentStatus::Failed,
            }),
            PaymentStatus::Completed | PaymentStatus::Failed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            other => anyhow::bail!("unknown payment status {other:?}"),
        }
    }
}

impl PaymentOutcome {
    /// Only an explicit "completed" counts as success; anything the gateway
    /// reports that we do not recognise is treated as a failure.
    pub fn from_gateway_description(description: Option<&str>) -> Self {
        match description {
            Some(d) if d.eq_ignore_ascii_case("completed") => PaymentOutcome::Completed,
            _ => PaymentOutcome::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub gateway_order_id: String,
    pub gateway_tracking_id: Option<String>,
    pub status: PaymentStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl PaymentRecord {
    pub fn pending(
        user_id: Uuid,
        amount: Decimal,
        gateway_order_id: String,
        gateway_tracking_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            gateway_order_id,
            gateway_tracking_id,
            status: PaymentStatus::Pending,
            created_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingInfo {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitActivationRequest {
    pub amount: Decimal,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl SubmitActivationRequest {
    pub fn billing_info(&self) -> BillingInfo {
        BillingInfo {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedOrder {
    pub redirect_url: String,
    pub order_id: String,
    pub tracking_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitActivationResponse {
    pub success: bool,
    pub redirect_url: String,
    pub order_id: String,
    pub tracking_id: Option<String>,
}

impl From<SubmittedOrder> for SubmitActivationResponse {
    fn from(order: SubmittedOrder) -> Self {
        Self {
            success: true,
            redirect_url: order.redirect_url,
            order_id: order.order_id,
            tracking_id: order.tracking_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}
