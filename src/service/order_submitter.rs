use crate::domain::order_id::generate_order_id;
use crate::domain::payment::{BillingInfo, PaymentRecord, SubmittedOrder};
use crate::error::ActivationError;
use crate::gateways::{OrderRequest, PaymentGateway};
use crate::repo::PaymentStore;
use crate::service::auth_broker::AuthBroker;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

const MAX_AMOUNT_SCALE: u32 = 2;

/// Largest amount `payments.amount` (NUMERIC(12,2)) can hold.
fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, MAX_AMOUNT_SCALE)
}

#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub currency: String,
    pub description: String,
    pub callback_url: String,
    pub notification_id: String,
}

#[derive(Clone)]
pub struct OrderSubmitter {
    pub auth: AuthBroker,
    pub gateway: Arc<dyn PaymentGateway>,
    pub payments: Arc<dyn PaymentStore>,
    pub settings: OrderSettings,
}

impl OrderSubmitter {
    /// Submits a one-time activation charge and records it as pending.
    ///
    /// Nothing is persisted unless the gateway accepts the order. Once it has,
    /// the pending record must be written before the redirect is handed back;
    /// a failed write fails the call and leaves an orphaned order upstream.
    pub async fn submit_activation_order(
        &self,
        user_id: Uuid,
        amount: Decimal,
        billing: BillingInfo,
    ) -> Result<SubmittedOrder, ActivationError> {
        let billing = validate_order(amount, billing)?;
        let token = self.auth.obtain_token().await?;

        let order = OrderRequest {
            id: generate_order_id(),
            currency: self.settings.currency.clone(),
            amount,
            description: self.settings.description.clone(),
            callback_url: self.settings.callback_url.clone(),
            notification_id: self.settings.notification_id.clone(),
            billing,
        };

        tracing::info!(order_id = %order.id, %user_id, %amount, "submitting activation order");
        let accepted = self.gateway.submit_order(&token, &order).await.map_err(|e| {
            tracing::warn!(order_id = %order.id, "gateway rejected activation order: {}", e);
            ActivationError::Submission(e)
        })?;

        let correlation_id = accepted
            .order_tracking_id
            .clone()
            .or_else(|| accepted.merchant_reference.clone());
        let record = PaymentRecord::pending(user_id, amount, order.id.clone(), correlation_id.clone());

        if let Err(e) = self.payments.insert(&record).await {
            tracing::error!(
                order_id = %order.id,
                tracking_id = ?correlation_id,
                "orphaned gateway order: accepted upstream but pending record was not stored: {}",
                e
            );
            return Err(ActivationError::Store(e));
        }

        tracing::info!(order_id = %order.id, tracking_id = ?correlation_id, "activation order pending");
        Ok(SubmittedOrder {
            redirect_url: accepted.redirect_url,
            order_id: order.id,
            tracking_id: accepted.order_tracking_id,
        })
    }
}

pub fn validate_order(amount: Decimal, billing: BillingInfo) -> Result<BillingInfo, ActivationError> {
    if amount <= Decimal::ZERO {
        return Err(ActivationError::Validation("amount must be > 0".to_string()));
    }
    if amount > max_amount() {
        return Err(ActivationError::Validation(format!("amount must not exceed {}", max_amount())));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(ActivationError::Validation(format!(
            "amount must have at most {MAX_AMOUNT_SCALE} decimal places"
        )));
    }

    let email = billing.email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(ActivationError::Validation("a valid email is required".to_string()));
    }
    let first_name = billing.first_name.trim().to_string();
    let last_name = billing.last_name.trim().to_string();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(ActivationError::Validation("first and last name are required".to_string()));
    }

    Ok(BillingInfo {
        email,
        first_name,
        last_name,
        phone_number: billing
            .phone_number
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn billing() -> BillingInfo {
        BillingInfo {
            email: " jane@example.com ".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone_number: Some("  ".to_string()),
        }
    }

    #[test]
    fn normalises_billing_fields() {
        let out = validate_order(dec!(10.00), billing()).unwrap();
        assert_eq!(out.email, "jane@example.com");
        assert_eq!(out.phone_number, None);
    }

    #[test]
    fn rejects_non_positive_amount() {
        assert!(matches!(
            validate_order(dec!(0), billing()),
            Err(ActivationError::Validation(_))
        ));
        assert!(matches!(
            validate_order(dec!(-5), billing()),
            Err(ActivationError::Validation(_))
        ));
    }

    #[test]
    fn rejects_sub_cent_amount() {
        assert!(validate_order(dec!(10.005), billing()).is_err());
        assert!(validate_order(dec!(10.500), billing()).is_ok());
    }

    #[test]
    fn rejects_amount_the_store_cannot_hold() {
        assert!(validate_order(dec!(9999999999.99), billing()).is_ok());
        assert!(matches!(
            validate_order(dec!(10000000000), billing()),
            Err(ActivationError::Validation(_))
        ));
    }

    #[test]
    fn rejects_missing_name_or_email() {
        let mut b = billing();
        b.last_name = " ".to_string();
        assert!(validate_order(dec!(10), b).is_err());

        let mut b = billing();
        b.email = "not-an-email".to_string();
        assert!(validate_order(dec!(10), b).is_err());
    }
}
