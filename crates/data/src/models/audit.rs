//! Settlement audit data model.

use chrono::{DateTime, Utc};
use optiondesk_core::settlement::SettlementDecision;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit entry written for every settlement.
///
/// Records both the natural outcome and the final outcome so forced
/// settlements are distinguishable after the fact. One entry per trade,
/// written in the same database transaction as the settlement itself.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SettlementAuditRecord {
    pub trade_id: Uuid,
    pub user_id: Uuid,
    /// Outcome implied by price movement: "win" or "loss".
    pub natural_outcome: String,
    /// Outcome actually applied: "win" or "loss".
    pub final_outcome: String,
    pub forced: bool,
    /// Trading mode in effect at settlement.
    pub trading_mode: String,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub settled_at: DateTime<Utc>,
}

impl SettlementAuditRecord {
    /// Builds an audit entry from a settlement decision.
    #[must_use]
    pub fn from_decision(
        trade_id: Uuid,
        user_id: Uuid,
        decision: &SettlementDecision,
        entry_price: Decimal,
        exit_price: Decimal,
        settled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            trade_id,
            user_id,
            natural_outcome: decision.natural.as_str().to_string(),
            final_outcome: decision.outcome.as_str().to_string(),
            forced: decision.forced,
            trading_mode: decision.mode.as_str().to_string(),
            entry_price,
            exit_price,
            settled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiondesk_core::settlement::decide;
    use optiondesk_core::types::{TradeDirection, TradingMode};
    use rust_decimal_macros::dec;

    #[test]
    fn audit_captures_forced_settlement() {
        let decision = decide(TradeDirection::Up, dec!(50000), dec!(50500), TradingMode::Lose);
        let audit = SettlementAuditRecord::from_decision(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &decision,
            dec!(50000),
            dec!(50500),
            Utc::now(),
        );

        assert_eq!(audit.natural_outcome, "win");
        assert_eq!(audit.final_outcome, "loss");
        assert!(audit.forced);
        assert_eq!(audit.trading_mode, "lose");
    }

    #[test]
    fn audit_captures_natural_settlement() {
        let decision = decide(
            TradeDirection::Down,
            dec!(3000),
            dec!(2990),
            TradingMode::Normal,
        );
        let audit = SettlementAuditRecord::from_decision(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &decision,
            dec!(3000),
            dec!(2990),
            Utc::now(),
        );

        assert_eq!(audit.natural_outcome, audit.final_outcome);
        assert!(!audit.forced);
    }
}
