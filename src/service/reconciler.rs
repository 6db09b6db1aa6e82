use crate::domain::payment::{PaymentOutcome, PaymentRecord, PaymentStatus};
use crate::error::ActivationError;
use crate::repo::{BalanceStore, PaymentStore};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileResult {
    Credited { user_id: Uuid, amount: Decimal },
    MarkedFailed,
    AlreadyTerminal(PaymentStatus),
    /// Another delivery moved the record first.
    LostRace,
    UnknownTransaction,
    /// Status is `completed` but the credit did not go through.
    CreditAnomaly { user_id: Uuid, amount: Decimal },
}

impl ReconcileResult {
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileResult::Credited { .. } => "credited",
            ReconcileResult::MarkedFailed => "marked_failed",
            ReconcileResult::AlreadyTerminal(_) => "already_terminal",
            ReconcileResult::LostRace => "lost_race",
            ReconcileResult::UnknownTransaction => "unknown_transaction",
            ReconcileResult::CreditAnomaly { .. } => "credit_anomaly",
        }
    }
}

#[derive(Clone)]
pub struct Reconciler {
    pub payments: Arc<dyn PaymentStore>,
    pub balances: Arc<dyn BalanceStore>,
}

impl Reconciler {
    /// Converges the record behind `tracking_id` on a confirmed outcome.
    ///
    /// Safe to call any number of times: a terminal record is left alone, and
    /// the pending-to-terminal move is a compare-and-set, so only one caller
    /// ever reaches the balance credit.
    pub async fn reconcile(
        &self,
        tracking_id: &str,
        outcome: PaymentOutcome,
    ) -> Result<ReconcileResult, ActivationError> {
        let Some(record) = self.locate(tracking_id).await? else {
            tracing::warn!(tracking_id, "notification for unknown transaction; ignoring");
            return Ok(ReconcileResult::UnknownTransaction);
        };

        let Some(next) = record.status.advance(outcome) else {
            tracing::info!(
                tracking_id,
                status = record.status.as_str(),
                "payment already terminal; nothing to do"
            );
            return Ok(ReconcileResult::AlreadyTerminal(record.status));
        };

        let moved = self
            .payments
            .conditional_update_status(record.id, PaymentStatus::Pending, next)
            .await?;
        if !moved {
            tracing::info!(tracking_id, "payment moved by a concurrent delivery");
            return Ok(ReconcileResult::LostRace);
        }
        tracing::info!(tracking_id, order_id = %record.gateway_order_id, "payment {}", next.as_str());

        if next != PaymentStatus::Completed {
            return Ok(ReconcileResult::MarkedFailed);
        }

        match self.balances.credit_balance(record.user_id, record.amount).await {
            Ok(()) => {
                tracing::info!(user_id = %record.user_id, amount = %record.amount, "activation credit applied");
                Ok(ReconcileResult::Credited {
                    user_id: record.user_id,
                    amount: record.amount,
                })
            }
            Err(e) => {
                tracing::error!(
                    tracking_id,
                    payment_id = %record.id,
                    user_id = %record.user_id,
                    amount = %record.amount,
                    "reconciliation anomaly: payment completed but balance credit failed: {}",
                    e
                );
                Ok(ReconcileResult::CreditAnomaly {
                    user_id: record.user_id,
                    amount: record.amount,
                })
            }
        }
    }

    async fn locate(&self, tracking_id: &str) -> anyhow::Result<Option<PaymentRecord>> {
        if let Some(record) = self.payments.find_by_tracking_id(tracking_id).await? {
            return Ok(Some(record));
        }
        self.payments.find_by_order_id(tracking_id).await
    }
}
