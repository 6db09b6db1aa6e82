use crate::domain::account::AccountBalance;
use crate::repo::BalanceStore;
use anyhow::Result;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct BalancesRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl BalanceStore for BalancesRepo {
    async fn credit_balance(&self, user_id: Uuid, amount: Decimal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO account_balances (user_id, balance, total_earned, updated_at)
            VALUES ($1, $2, $2, now())
            ON CONFLICT (user_id) DO UPDATE SET
                balance = account_balances.balance + EXCLUDED.balance,
                total_earned = account_balances.total_earned + EXCLUDED.total_earned,
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<AccountBalance>> {
        let row = sqlx::query("SELECT user_id, balance, total_earned FROM account_balances WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| AccountBalance {
            user_id: r.get("user_id"),
            balance: r.get("balance"),
            total_earned: r.get("total_earned"),
        }))
    }
}
