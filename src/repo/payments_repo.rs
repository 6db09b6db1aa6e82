use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::repo::PaymentStore;
use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, amount, gateway_order_id, gateway_tracking_id, status, created_at FROM payments";

fn to_record(row: PgRow) -> Result<PaymentRecord> {
    let status: String = row.try_get("status")?;
    Ok(PaymentRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        amount: row.try_get("amount")?,
        gateway_order_id: row.try_get("gateway_order_id")?,
        gateway_tracking_id: row.try_get("gateway_tracking_id")?,
        status: PaymentStatus::parse(&status)?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait::async_trait]
impl PaymentStore for PaymentsRepo {
    async fn insert(&self, record: &PaymentRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, amount, gateway_order_id, gateway_tracking_id, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.amount)
        .bind(&record.gateway_order_id)
        .bind(&record.gateway_tracking_id)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_tracking_id(&self, tracking_id: &str) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE gateway_tracking_id = $1"))
            .bind(tracking_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(to_record).transpose()
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE gateway_order_id = $1"))
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(to_record).transpose()
    }

    async fn conditional_update_status(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        new: PaymentStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE payments SET status = $3, updated_at = now() WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(new.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_pending(
        &self,
        older_than: chrono::DateTime<chrono::Utc>,
        limit: i64,
    ) -> Result<Vec<PaymentRecord>> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE status = 'pending' AND created_at <= $1 ORDER BY created_at ASC LIMIT $2"
        ))
        .bind(older_than)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(to_record).collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
