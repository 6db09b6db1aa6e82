use crate::domain::notification::{IpnAck, IpnNotification};
use crate::domain::payment::PaymentOutcome;
use crate::error::ActivationError;
use crate::gateways::{PaymentGateway, TransactionStatus};
use crate::service::auth_broker::AuthBroker;
use crate::service::reconciler::{ReconcileResult, Reconciler};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct NotificationHandler {
    pub auth: AuthBroker,
    pub gateway: Arc<dyn PaymentGateway>,
    pub reconciler: Reconciler,
}

impl NotificationHandler {
    /// Entry point for gateway callbacks.
    ///
    /// Notifications we do not act on are acknowledged with `OK`. For a state
    /// change the payload is only a trigger: the outcome always comes from a
    /// fresh status query. An `Err` means no acknowledgment should be sent, so
    /// the gateway delivers again later.
    pub async fn handle(&self, params: &HashMap<String, String>) -> Result<IpnAck, ActivationError> {
        let notification = IpnNotification::from_query(params);
        tracing::info!(
            notification_type = ?notification.notification_type.as_ref().map(|p| p.value.as_str()),
            tracking_id = ?notification.tracking_id.as_ref().map(|p| p.value.as_str()),
            merchant_reference = ?notification.merchant_reference.as_ref().map(|p| p.value.as_str()),
            "payment notification received"
        );

        let Some(tracking_id) = notification.actionable_tracking_id() else {
            tracing::warn!("notification not actionable; acknowledging without changes");
            return Ok(IpnAck::Ok);
        };

        let result = self.confirm_and_reconcile(tracking_id).await?;
        tracing::info!(tracking_id, result = result.label(), "notification reconciled");

        Ok(IpnAck::Echo(notification.ack_body()))
    }

    /// Fresh token, authoritative status query, then idempotent reconcile.
    pub async fn confirm_and_reconcile(&self, tracking_id: &str) -> Result<ReconcileResult, ActivationError> {
        let status = self.authoritative_status(tracking_id).await?;
        self.apply_status(tracking_id, &status).await
    }

    /// Same as `confirm_and_reconcile`, except a payment the gateway has not
    /// settled yet is left pending and `None` is returned. Used where nothing
    /// signalled a state change, so a checkout still in progress stays open.
    pub async fn reconcile_if_final(&self, tracking_id: &str) -> Result<Option<ReconcileResult>, ActivationError> {
        let status = self.authoritative_status(tracking_id).await?;
        if !status.is_final() {
            tracing::info!(
                tracking_id,
                gateway_status = ?status.payment_status_description,
                "payment not settled at gateway; leaving pending"
            );
            return Ok(None);
        }
        self.apply_status(tracking_id, &status).await.map(Some)
    }

    async fn authoritative_status(&self, tracking_id: &str) -> Result<TransactionStatus, ActivationError> {
        let token = self.auth.obtain_token().await?;

        self.gateway
            .transaction_status(&token, tracking_id)
            .await
            .map_err(|e| {
                tracing::warn!(tracking_id, "transaction status query failed: {}", e);
                ActivationError::StatusQuery(e)
            })
    }

    async fn apply_status(
        &self,
        tracking_id: &str,
        status: &TransactionStatus,
    ) -> Result<ReconcileResult, ActivationError> {
        let outcome = PaymentOutcome::from_gateway_description(status.payment_status_description.as_deref());
        tracing::info!(
            tracking_id,
            gateway_status = ?status.payment_status_description,
            ?outcome,
            "authoritative transaction status"
        );

        self.reconciler.reconcile(tracking_id, outcome).await.map_err(|e| {
            tracing::error!(tracking_id, "reconciliation failed before any state change: {}", e);
            e
        })
    }
}
