use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub user_id: Uuid,
    pub balance: Decimal,
    pub total_earned: Decimal,
}

impl AccountBalance {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            balance: Decimal::ZERO,
            total_earned: Decimal::ZERO,
        }
    }

    pub fn credit(&mut self, amount: Decimal) {
        self.balance += amount;
        self.total_earned += amount;
    }
}
