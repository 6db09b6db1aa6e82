pub mod config;
pub mod error;
pub mod domain {
    pub mod account;
    pub mod notification;
    pub mod order_id;
    pub mod payment;
}
pub mod gateways;
pub mod http {
    pub mod errors;
    pub mod handlers {
        pub mod activation;
        pub mod admin;
        pub mod ipn;
        pub mod ops;
    }
    pub mod middleware {
        pub mod admin_auth;
        pub mod rate_limit;
    }
    pub mod router;
}
pub mod repo;
pub mod service {
    pub mod auth_broker;
    pub mod notification_handler;
    pub mod order_submitter;
    pub mod reconciler;
    pub mod sweeper;
}

use config::GatewayCredentials;
use gateways::PaymentGateway;
use repo::{BalanceStore, PaymentStore};
use service::auth_broker::AuthBroker;
use service::notification_handler::NotificationHandler;
use service::order_submitter::{OrderSettings, OrderSubmitter};
use service::reconciler::Reconciler;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub order_submitter: OrderSubmitter,
    pub notification_handler: NotificationHandler,
    pub payments: Arc<dyn PaymentStore>,
    pub redis_client: Option<redis::Client>,
}

impl AppState {
    /// Wires the order and notification paths. They share the gateway and the
    /// store but keep separate auth brokers and no in-process session.
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        credentials: GatewayCredentials,
        payments: Arc<dyn PaymentStore>,
        balances: Arc<dyn BalanceStore>,
        settings: OrderSettings,
    ) -> Self {
        let order_submitter = OrderSubmitter {
            auth: AuthBroker {
                gateway: gateway.clone(),
                credentials: credentials.clone(),
            },
            gateway: gateway.clone(),
            payments: payments.clone(),
            settings,
        };
        let notification_handler = NotificationHandler {
            auth: AuthBroker {
                gateway: gateway.clone(),
                credentials,
            },
            gateway,
            reconciler: Reconciler {
                payments: payments.clone(),
                balances,
            },
        };

        Self {
            order_submitter,
            notification_handler,
            payments,
            redis_client: None,
        }
    }
}
