use crate::domain::account::AccountBalance;
use crate::domain::payment::{PaymentRecord, PaymentStatus};
use anyhow::Result;
use rust_decimal::Decimal;
use uuid::Uuid;

pub mod balances_repo;
pub mod in_memory;
pub mod payments_repo;

#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, record: &PaymentRecord) -> Result<()>;

    async fn find_by_tracking_id(&self, tracking_id: &str) -> Result<Option<PaymentRecord>>;

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<PaymentRecord>>;

    /// Moves the record to `new` only if it is still in `expected`. Returns
    /// whether this call performed the move; concurrent callers racing on the
    /// same record see exactly one `true`.
    async fn conditional_update_status(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        new: PaymentStatus,
    ) -> Result<bool>;

    async fn list_pending(
        &self,
        older_than: chrono::DateTime<chrono::Utc>,
        limit: i64,
    ) -> Result<Vec<PaymentRecord>>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait::async_trait]
pub trait BalanceStore: Send + Sync {
    async fn credit_balance(&self, user_id: Uuid, amount: Decimal) -> Result<()>;

    async fn get(&self, user_id: Uuid) -> Result<Option<AccountBalance>>;
}
