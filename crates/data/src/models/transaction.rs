//! Balance transaction data model.

use chrono::{DateTime, Utc};
use optiondesk_core::types::{TransactionKind, TransactionStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A balance-affecting transaction.
///
/// `amount` is always a positive magnitude; the sign of the balance effect
/// comes from `kind` (withdrawals and trade losses subtract).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Kind: "deposit", "withdrawal", "trade_win", "trade_loss", "bonus".
    pub kind: String,
    pub amount: Decimal,
    /// Status: "pending", "completed", "failed", "rejected".
    pub status: String,
    /// Free-form link to the originating entity (trade id, redeem code).
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
}

impl TransactionRecord {
    /// Creates a pending transaction awaiting admin review.
    #[must_use]
    pub fn pending(user_id: Uuid, kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind: kind.as_str().to_string(),
            amount,
            status: TransactionStatus::Pending.as_str().to_string(),
            reference: None,
            created_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    /// Creates a completed transaction written by the ledger.
    #[must_use]
    pub fn completed(
        user_id: Uuid,
        kind: TransactionKind,
        amount: Decimal,
        reference: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind: kind.as_str().to_string(),
            amount,
            status: TransactionStatus::Completed.as_str().to_string(),
            reference,
            created_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    /// Returns the parsed transaction kind.
    #[must_use]
    pub fn parsed_kind(&self) -> Option<TransactionKind> {
        TransactionKind::parse(&self.kind)
    }

    /// Returns the parsed transaction status.
    #[must_use]
    pub fn parsed_status(&self) -> Option<TransactionStatus> {
        TransactionStatus::parse(&self.status)
    }

    /// Returns true if the transaction is waiting for admin review.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == "pending"
    }

    /// Signed balance effect of this transaction once completed.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.parsed_kind() {
            Some(TransactionKind::Withdrawal | TransactionKind::TradeLoss) => -self.amount,
            _ => self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pending_transaction_defaults() {
        let tx = TransactionRecord::pending(Uuid::new_v4(), TransactionKind::Deposit, dec!(500));

        assert!(tx.is_pending());
        assert_eq!(tx.kind, "deposit");
        assert!(tx.reviewed_at.is_none());
        assert!(tx.reviewed_by.is_none());
    }

    #[test]
    fn completed_transaction_carries_reference() {
        let trade_id = Uuid::new_v4();
        let tx = TransactionRecord::completed(
            Uuid::new_v4(),
            TransactionKind::TradeWin,
            dec!(85),
            Some(trade_id.to_string()),
        );

        assert!(!tx.is_pending());
        assert_eq!(tx.status, "completed");
        assert_eq!(tx.reference, Some(trade_id.to_string()));
    }

    #[test]
    fn signed_amount_by_kind() {
        let user_id = Uuid::new_v4();
        let deposit = TransactionRecord::completed(user_id, TransactionKind::Deposit, dec!(100), None);
        let withdrawal =
            TransactionRecord::completed(user_id, TransactionKind::Withdrawal, dec!(40), None);
        let win = TransactionRecord::completed(user_id, TransactionKind::TradeWin, dec!(85), None);
        let loss = TransactionRecord::completed(user_id, TransactionKind::TradeLoss, dec!(100), None);
        let bonus = TransactionRecord::completed(user_id, TransactionKind::Bonus, dec!(25), None);

        assert_eq!(deposit.signed_amount(), dec!(100));
        assert_eq!(withdrawal.signed_amount(), dec!(-40));
        assert_eq!(win.signed_amount(), dec!(85));
        assert_eq!(loss.signed_amount(), dec!(-100));
        assert_eq!(bonus.signed_amount(), dec!(25));
    }
}
