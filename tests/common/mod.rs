#![allow(dead_code)]

use activation_payments::config::GatewayCredentials;
use activation_payments::domain::account::AccountBalance;
use activation_payments::domain::payment::{BillingInfo, PaymentRecord, SubmittedOrder};
use activation_payments::gateways::mock::MockGateway;
use activation_payments::repo::in_memory::{InMemoryBalanceStore, InMemoryPaymentStore};
use activation_payments::repo::{BalanceStore, PaymentStore};
use activation_payments::service::order_submitter::OrderSettings;
use activation_payments::AppState;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const CALLBACK_URL: &str = "https://app.example.com/activation-success";
pub const IPN_ID: &str = "ipn-channel-1";

pub struct Harness {
    pub gateway: Arc<MockGateway>,
    pub payments: InMemoryPaymentStore,
    pub balances: InMemoryBalanceStore,
    pub state: AppState,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_default_status("Completed")
    }

    pub fn with_default_status(status: &str) -> Self {
        let gateway = Arc::new(MockGateway::new(status));
        let payments = InMemoryPaymentStore::new();
        let balances = InMemoryBalanceStore::new();
        let state = AppState::new(
            gateway.clone(),
            GatewayCredentials::new(Some("test-key".to_string()), Some("test-secret".to_string())).unwrap(),
            Arc::new(payments.clone()),
            Arc::new(balances.clone()),
            OrderSettings {
                currency: "KES".to_string(),
                description: "Account Activation Fee".to_string(),
                callback_url: CALLBACK_URL.to_string(),
                notification_id: IPN_ID.to_string(),
            },
        );

        Self {
            gateway,
            payments,
            balances,
            state,
        }
    }

    pub async fn submit(&self, user_id: Uuid, amount: Decimal) -> SubmittedOrder {
        self.state
            .order_submitter
            .submit_activation_order(user_id, amount, billing())
            .await
            .unwrap()
    }

    pub async fn record(&self, order_id: &str) -> PaymentRecord {
        self.payments.find_by_order_id(order_id).await.unwrap().unwrap()
    }

    pub async fn balance(&self, user_id: Uuid) -> Option<AccountBalance> {
        self.balances.get(user_id).await.unwrap()
    }
}

pub fn billing() -> BillingInfo {
    BillingInfo {
        email: "jane@example.com".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        phone_number: Some("0712345678".to_string()),
    }
}

pub fn change_notification(tracking_id: &str, merchant_reference: &str) -> HashMap<String, String> {
    HashMap::from([
        ("pesapal_notification_type".to_string(), "CHANGE".to_string()),
        ("pesapal_transaction_tracking_id".to_string(), tracking_id.to_string()),
        ("pesapal_merchant_reference".to_string(), merchant_reference.to_string()),
    ])
}
