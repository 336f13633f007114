//! Redeem code data model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A promotional code that credits a fixed bonus amount when claimed.
///
/// `max_claims` of `None` means unlimited; each user may claim a given code
/// at most once regardless of the cap.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RedeemCodeRecord {
    pub code: String,
    pub amount: Decimal,
    pub max_claims: Option<i32>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub disabled: bool,
}

impl RedeemCodeRecord {
    /// Creates a new enabled redeem code.
    #[must_use]
    pub fn new(code: String, amount: Decimal, max_claims: Option<i32>, created_by: Uuid) -> Self {
        Self {
            code,
            amount,
            max_claims,
            created_by,
            created_at: Utc::now(),
            disabled: false,
        }
    }

    /// Returns true if `claim_count` existing claims leave room for another.
    #[must_use]
    pub fn has_capacity(&self, claim_count: i64) -> bool {
        match self.max_claims {
            Some(max) => claim_count < i64::from(max),
            None => true,
        }
    }
}

/// One user's claim of a redeem code.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RedeemClaimRecord {
    pub code: String,
    pub user_id: Uuid,
    pub claimed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn capacity_with_cap() {
        let code = RedeemCodeRecord::new("WELCOME50".to_string(), dec!(50), Some(3), Uuid::new_v4());

        assert!(code.has_capacity(0));
        assert!(code.has_capacity(2));
        assert!(!code.has_capacity(3));
        assert!(!code.has_capacity(10));
    }

    #[test]
    fn capacity_unlimited() {
        let code = RedeemCodeRecord::new("OPEN".to_string(), dec!(10), None, Uuid::new_v4());
        assert!(code.has_capacity(1_000_000));
    }

    #[test]
    fn new_code_is_enabled() {
        let code = RedeemCodeRecord::new("X".to_string(), dec!(5), None, Uuid::new_v4());
        assert!(!code.disabled);
    }
}
