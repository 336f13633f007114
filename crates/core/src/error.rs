//! Domain error taxonomy.
//!
//! Web handlers map each variant to an HTTP status and the JSON error
//! envelope; the engine uses the trading/wallet variants to refuse work
//! without tearing down an actor.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DeskError {
    /// Request payload failed validation (bad stake, unknown symbol, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing, expired, or malformed credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (role or ownership check failed).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Entity does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// Stake or withdrawal exceeds the available balance.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    /// Account is suspended or banned.
    #[error("account {user_id} is {status}")]
    AccountRestricted { user_id: Uuid, status: String },

    /// Trade is no longer active; settlement or cancellation is a no-op.
    #[error("trade {0} is not active")]
    TradeNotActive(Uuid),

    /// The freshest quote for a symbol is too old to settle against.
    #[error("stale price for {symbol}: last quote {age_secs}s old")]
    StalePrice { symbol: String, age_secs: i64 },

    /// Redeem code already claimed by this user, disabled, or exhausted.
    #[error("redeem code rejected: {0}")]
    RedeemRejected(String),

    /// Anything below the domain: database, channels, serialization.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DeskError {
    /// Stable machine-readable kind for the API error envelope.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::AccountRestricted { .. } => "account_restricted",
            Self::TradeNotActive(_) => "trade_not_active",
            Self::StalePrice { .. } => "stale_price",
            Self::RedeemRejected(_) => "redeem_rejected",
            Self::Internal(_) => "internal",
        }
    }
}

pub type DeskResult<T> = Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kinds_are_stable() {
        let err = DeskError::InsufficientBalance {
            requested: dec!(100),
            available: dec!(40),
        };
        assert_eq!(err.kind(), "insufficient_balance");
        assert!(err.to_string().contains("requested 100"));

        let err = DeskError::NotFound {
            kind: "trade",
            id: "abc".to_string(),
        };
        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.to_string(), "trade abc not found");
    }

    #[test]
    fn internal_wraps_anyhow() {
        let err: DeskError = anyhow::anyhow!("pool exhausted").into();
        assert_eq!(err.kind(), "internal");
    }
}
