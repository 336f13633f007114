use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A price observation for one symbol.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl PriceQuote {
    /// Age of this quote in whole seconds at `now`.
    #[must_use]
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_seconds()
    }
}

/// Events broadcast by the engine to WebSocket subscribers.
///
/// Balance-bearing events carry the owning `user_id` so the hub can route
/// them to that user's sessions and to admin dashboards only.
#[derive(Debug, Clone)]
pub enum DeskEvent {
    PriceTick(PriceQuote),
    BalanceUpdate {
        user_id: Uuid,
        balance: Decimal,
    },
    TradeOpened {
        user_id: Uuid,
        trade_id: Uuid,
        symbol: String,
        stake: Decimal,
    },
    TradeCompleted {
        user_id: Uuid,
        trade_id: Uuid,
        outcome: String,
        profit: Decimal,
        exit_price: Decimal,
        new_balance: Decimal,
    },
    TransactionReviewed {
        user_id: Uuid,
        transaction_id: Uuid,
        kind: String,
        status: String,
        new_balance: Option<Decimal>,
    },
}

impl DeskEvent {
    /// Returns the user this event belongs to, if it is user-scoped.
    #[must_use]
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::PriceTick(_) => None,
            Self::BalanceUpdate { user_id, .. }
            | Self::TradeOpened { user_id, .. }
            | Self::TradeCompleted { user_id, .. }
            | Self::TransactionReviewed { user_id, .. } => Some(*user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quote_age() {
        let now = Utc::now();
        let quote = PriceQuote {
            symbol: "BTCUSDT".to_string(),
            price: dec!(50000),
            timestamp: now - chrono::Duration::seconds(7),
        };
        assert_eq!(quote.age_secs(now), 7);
    }

    #[test]
    fn event_user_scoping() {
        let tick = DeskEvent::PriceTick(PriceQuote {
            symbol: "BTCUSDT".to_string(),
            price: dec!(50000),
            timestamp: Utc::now(),
        });
        assert!(tick.user_id().is_none());

        let user_id = Uuid::new_v4();
        let update = DeskEvent::BalanceUpdate {
            user_id,
            balance: dec!(100),
        };
        assert_eq!(update.user_id(), Some(user_id));
    }
}
