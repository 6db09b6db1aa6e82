use crate::repo::PaymentStore;
use crate::service::notification_handler::NotificationHandler;
use crate::service::reconciler::ReconcileResult;
use anyhow::Result;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub resolved: usize,
    pub still_pending: usize,
    pub errors: usize,
}

/// Re-queries every stale pending record and settles the ones the gateway
/// reports as final. Anything still open at the gateway stays pending so a
/// late notification can still credit it. One record failing does not stop
/// the rest.
pub async fn sweep_pending(
    payments: &dyn PaymentStore,
    handler: &NotificationHandler,
    older_than: chrono::DateTime<chrono::Utc>,
    limit: i64,
) -> Result<SweepReport> {
    let pending = payments.list_pending(older_than, limit).await?;
    let mut report = SweepReport {
        scanned: pending.len(),
        ..SweepReport::default()
    };

    for record in pending {
        let Some(tracking_id) = record.gateway_tracking_id.as_deref() else {
            tracing::warn!(order_id = %record.gateway_order_id, "pending payment has no tracking id; skipping");
            report.still_pending += 1;
            continue;
        };

        match handler.reconcile_if_final(tracking_id).await {
            Ok(Some(ReconcileResult::UnknownTransaction)) | Ok(None) => report.still_pending += 1,
            Ok(Some(_)) => report.resolved += 1,
            Err(e) => {
                tracing::warn!(%tracking_id, "sweep could not reconcile payment: {}", e);
                report.errors += 1;
            }
        }
    }

    Ok(report)
}
