//! Binary-options trade data model.

use chrono::{DateTime, Duration, Utc};
use optiondesk_core::types::{TradeDirection, TradeOutcome, TradeStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A binary-options trade.
///
/// The stake is not deducted when the trade opens; the full balance effect
/// lands at settlement as a single signed profit amount.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TradeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    /// Direction: "up" or "down".
    pub direction: String,
    pub stake: Decimal,
    pub duration_secs: i64,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    /// Payout rate frozen at placement time.
    pub payout_rate: Decimal,
    /// Status: "active", "completed", "cancelled".
    pub status: String,
    /// Outcome after settlement: "win", "loss", or null.
    pub outcome: Option<String>,
    /// Signed balance effect; positive for wins, negative stake for losses.
    pub profit: Option<Decimal>,
    pub placed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl TradeRecord {
    /// Creates a new active trade expiring `duration_secs` after `placed_at`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        symbol: String,
        direction: TradeDirection,
        stake: Decimal,
        duration_secs: i64,
        entry_price: Decimal,
        payout_rate: Decimal,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            symbol,
            direction: direction.as_str().to_string(),
            stake,
            duration_secs,
            entry_price,
            exit_price: None,
            payout_rate,
            status: TradeStatus::Active.as_str().to_string(),
            outcome: None,
            profit: None,
            placed_at,
            expires_at: placed_at + Duration::seconds(duration_secs),
            settled_at: None,
        }
    }

    /// Returns true if the trade is still waiting for expiry.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Returns true if the trade has been settled.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    /// Returns true if the trade is past its expiry time.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns the parsed trade direction.
    #[must_use]
    pub fn parsed_direction(&self) -> Option<TradeDirection> {
        TradeDirection::parse(&self.direction)
    }

    /// Returns the parsed trade status.
    #[must_use]
    pub fn parsed_status(&self) -> Option<TradeStatus> {
        TradeStatus::parse(&self.status)
    }

    /// Returns the parsed outcome if settled.
    #[must_use]
    pub fn parsed_outcome(&self) -> Option<TradeOutcome> {
        self.outcome.as_deref().and_then(TradeOutcome::parse)
    }

    /// Returns the profit this trade pays if it wins.
    #[must_use]
    pub fn potential_profit(&self) -> Decimal {
        self.stake * self.payout_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn sample_trade() -> TradeRecord {
        TradeRecord::new(
            Uuid::new_v4(),
            "BTCUSDT".to_string(),
            TradeDirection::Up,
            dec!(100),
            30,
            dec!(50000),
            dec!(0.85),
            sample_time(),
        )
    }

    #[test]
    fn new_trade_is_active_with_expiry() {
        let trade = sample_trade();

        assert!(trade.is_active());
        assert!(!trade.is_completed());
        assert_eq!(trade.expires_at, sample_time() + Duration::seconds(30));
        assert!(trade.outcome.is_none());
        assert!(trade.profit.is_none());
        assert!(trade.exit_price.is_none());
    }

    #[test]
    fn expiry_check() {
        let trade = sample_trade();

        assert!(!trade.is_expired(sample_time() + Duration::seconds(29)));
        assert!(trade.is_expired(sample_time() + Duration::seconds(30)));
        assert!(trade.is_expired(sample_time() + Duration::seconds(300)));
    }

    #[test]
    fn potential_profit_uses_frozen_rate() {
        let trade = sample_trade();
        assert_eq!(trade.potential_profit(), dec!(85));
    }

    #[test]
    fn parsed_fields() {
        let trade = sample_trade();
        assert_eq!(trade.parsed_direction(), Some(TradeDirection::Up));
        assert_eq!(trade.parsed_status(), Some(TradeStatus::Active));
        assert_eq!(trade.parsed_outcome(), None);
    }
}
