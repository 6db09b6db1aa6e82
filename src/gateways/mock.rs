use crate::config::GatewayCredentials;
use crate::error::GatewayError;
use crate::gateways::{GatewayToken, OrderAccepted, OrderRequest, PaymentGateway, TransactionStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-process gateway for local runs and tests. Every behaviour can be
/// flipped at runtime and every call is counted.
pub struct MockGateway {
    pub reject_auth: AtomicBool,
    pub reject_orders: AtomicBool,
    pub fail_status_queries: AtomicBool,
    pub omit_tracking_id: AtomicBool,
    pub token_requests: AtomicUsize,
    pub status_queries: AtomicUsize,
    default_status: String,
    statuses: Mutex<HashMap<String, String>>,
    orders: Mutex<Vec<OrderRequest>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new("Completed")
    }
}

impl MockGateway {
    pub fn new(default_status: &str) -> Self {
        Self {
            reject_auth: AtomicBool::new(false),
            reject_orders: AtomicBool::new(false),
            fail_status_queries: AtomicBool::new(false),
            omit_tracking_id: AtomicBool::new(false),
            token_requests: AtomicUsize::new(0),
            status_queries: AtomicUsize::new(0),
            default_status: default_status.to_string(),
            statuses: Mutex::new(HashMap::new()),
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn set_status(&self, tracking_id: &str, description: &str) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.insert(tracking_id.to_string(), description.to_string());
        }
    }

    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn token_request_count(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn status_query_count(&self) -> usize {
        self.status_queries.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn request_token(&self, _credentials: &GatewayCredentials) -> Result<GatewayToken, GatewayError> {
        self.token_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_auth.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 401,
                body: "mock invalid consumer credentials".to_string(),
            });
        }
        Ok(GatewayToken {
            token: format!("mock_token_{}", uuid::Uuid::new_v4()),
            expiry_date: None,
        })
    }

    async fn submit_order(
        &self,
        _token: &GatewayToken,
        order: &OrderRequest,
    ) -> Result<OrderAccepted, GatewayError> {
        if self.reject_orders.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 400,
                body: "mock order declined".to_string(),
            });
        }
        if let Ok(mut orders) = self.orders.lock() {
            orders.push(order.clone());
        }

        let tracking_id = format!("mock_trk_{}", uuid::Uuid::new_v4());
        Ok(OrderAccepted {
            redirect_url: format!("https://mock.gateway.local/checkout?OrderTrackingId={tracking_id}"),
            order_tracking_id: (!self.omit_tracking_id.load(Ordering::SeqCst)).then_some(tracking_id),
            merchant_reference: Some(order.id.clone()),
        })
    }

    async fn transaction_status(
        &self,
        _token: &GatewayToken,
        tracking_id: &str,
    ) -> Result<TransactionStatus, GatewayError> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_status_queries.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 503,
                body: "mock status service unavailable".to_string(),
            });
        }

        let description = self
            .statuses
            .lock()
            .ok()
            .and_then(|s| s.get(tracking_id).cloned())
            .unwrap_or_else(|| self.default_status.clone());

        Ok(TransactionStatus {
            payment_status_description: Some(description),
            status_code: None,
            confirmation_code: None,
            merchant_reference: None,
        })
    }
}
