use crate::domain::account::AccountBalance;
use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::repo::{BalanceStore, PaymentStore};
use anyhow::Result;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Payment records held in process memory.
///
/// The status compare-and-set runs under the write lock, so it has the same
/// single-winner behaviour as the conditional `UPDATE` in Postgres.
/// `unavailable` makes every call fail, for exercising outage paths.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    records: Arc<RwLock<HashMap<Uuid, PaymentRecord>>>,
    pub unavailable: Arc<AtomicBool>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<PaymentRecord> {
        self.records.read().await.values().cloned().collect()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            anyhow::bail!("payment store unavailable");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, record: &PaymentRecord) -> Result<()> {
        self.check_available()?;
        let mut records = self.records.write().await;
        if records.values().any(|r| r.gateway_order_id == record.gateway_order_id) {
            anyhow::bail!("duplicate gateway_order_id {}", record.gateway_order_id);
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_tracking_id(&self, tracking_id: &str) -> Result<Option<PaymentRecord>> {
        self.check_available()?;
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.gateway_tracking_id.as_deref() == Some(tracking_id))
            .cloned())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<PaymentRecord>> {
        self.check_available()?;
        let records = self.records.read().await;
        Ok(records.values().find(|r| r.gateway_order_id == order_id).cloned())
    }

    async fn conditional_update_status(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        new: PaymentStatus,
    ) -> Result<bool> {
        self.check_available()?;
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(record) if record.status == expected => {
                record.status = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_pending(
        &self,
        older_than: chrono::DateTime<chrono::Utc>,
        limit: i64,
    ) -> Result<Vec<PaymentRecord>> {
        self.check_available()?;
        let records = self.records.read().await;
        let mut pending: Vec<PaymentRecord> = records
            .values()
            .filter(|r| r.status == PaymentStatus::Pending && r.created_at <= older_than)
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        pending.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(pending)
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}

/// Account balances held in process memory. `fail_credits` makes
/// `credit_balance` fail without touching state.
#[derive(Default, Clone)]
pub struct InMemoryBalanceStore {
    balances: Arc<RwLock<HashMap<Uuid, AccountBalance>>>,
    pub fail_credits: Arc<AtomicBool>,
    credits_applied: Arc<AtomicUsize>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credits_applied(&self) -> usize {
        self.credits_applied.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn credit_balance(&self, user_id: Uuid, amount: Decimal) -> Result<()> {
        if self.fail_credits.load(Ordering::SeqCst) {
            anyhow::bail!("balance store unavailable");
        }
        let mut balances = self.balances.write().await;
        balances
            .entry(user_id)
            .or_insert_with(|| AccountBalance::empty(user_id))
            .credit(amount);
        self.credits_applied.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<AccountBalance>> {
        let balances = self.balances.read().await;
        Ok(balances.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(order_id: &str, tracking_id: &str) -> PaymentRecord {
        PaymentRecord::pending(
            Uuid::new_v4(),
            dec!(10.00),
            order_id.to_string(),
            Some(tracking_id.to_string()),
        )
    }

    #[tokio::test]
    async fn finds_by_tracking_and_order_id() {
        let store = InMemoryPaymentStore::new();
        let rec = record("ORD-1", "trk-1");
        store.insert(&rec).await.unwrap();

        assert_eq!(store.find_by_tracking_id("trk-1").await.unwrap(), Some(rec.clone()));
        assert_eq!(store.find_by_order_id("ORD-1").await.unwrap(), Some(rec));
        assert!(store.find_by_tracking_id("trk-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_duplicate_order_id() {
        let store = InMemoryPaymentStore::new();
        store.insert(&record("ORD-1", "trk-1")).await.unwrap();
        assert!(store.insert(&record("ORD-1", "trk-2")).await.is_err());
    }

    #[tokio::test]
    async fn conditional_update_only_moves_expected_status() {
        let store = InMemoryPaymentStore::new();
        let rec = record("ORD-1", "trk-1");
        store.insert(&rec).await.unwrap();

        assert!(store
            .conditional_update_status(rec.id, PaymentStatus::Pending, PaymentStatus::Completed)
            .await
            .unwrap());
        assert!(!store
            .conditional_update_status(rec.id, PaymentStatus::Pending, PaymentStatus::Failed)
            .await
            .unwrap());
        let stored = store.find_by_order_id("ORD-1").await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn credit_adds_to_balance_and_total() {
        let store = InMemoryBalanceStore::new();
        let user = Uuid::new_v4();
        store.credit_balance(user, dec!(10.00)).await.unwrap();
        store.credit_balance(user, dec!(2.50)).await.unwrap();

        let balance = store.get(user).await.unwrap().unwrap();
        assert_eq!(balance.balance, dec!(12.50));
        assert_eq!(balance.total_earned, dec!(12.50));
        assert_eq!(store.credits_applied(), 2);
    }

    #[tokio::test]
    async fn list_pending_skips_terminal_records() {
        let store = InMemoryPaymentStore::new();
        let a = record("ORD-1", "trk-1");
        let b = record("ORD-2", "trk-2");
        store.insert(&a).await.unwrap();
        store.insert(&b).await.unwrap();
        store
            .conditional_update_status(b.id, PaymentStatus::Pending, PaymentStatus::Failed)
            .await
            .unwrap();

        let pending = store.list_pending(chrono::Utc::now(), 10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].gateway_order_id, "ORD-1");
    }
}
