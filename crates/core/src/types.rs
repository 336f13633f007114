//! Domain enums shared across the platform.
//!
//! All enums are stored as lowercase strings in the database and expose
//! `as_str`/`parse` pairs for conversion at the persistence boundary.

use serde::{Deserialize, Serialize};

/// Direction of a binary-options trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    /// Betting the price will be above the entry price at expiry.
    Up,
    /// Betting the price will be below the entry price at expiry.
    Down,
}

impl TradeDirection {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

/// Lifecycle status of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Trade is open and waiting for expiry.
    Active,
    /// Trade has been settled; outcome and profit are final.
    Completed,
    /// Trade was cancelled before settlement.
    Cancelled,
}

impl TradeStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Final outcome of a settled trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeOutcome {
    Win,
    Loss,
}

impl TradeOutcome {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "win" => Some(Self::Win),
            "loss" => Some(Self::Loss),
            _ => None,
        }
    }
}

/// Per-user outcome override set by an admin.
///
/// Consulted as an input to the settlement decision, never applied after the
/// fact. `Win`/`Lose` force the respective outcome regardless of price
/// movement; forced settlements are flagged in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    /// Outcome follows actual price movement.
    #[default]
    Normal,
    /// Every settlement resolves as a win.
    Win,
    /// Every settlement resolves as a loss.
    Lose,
}

impl TradingMode {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Win => "win",
            Self::Lose => "lose",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "win" => Some(Self::Win),
            "lose" => Some(Self::Lose),
            _ => None,
        }
    }
}

/// Role of a platform account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Returns true for admin and super-admin roles.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

/// Account standing. Suspended and banned users cannot place trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
    Banned,
}

impl UserStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Banned => "banned",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "banned" => Some(Self::Banned),
            _ => None,
        }
    }
}

/// Kind of a balance-affecting transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    TradeWin,
    TradeLoss,
    Bonus,
}

impl TransactionKind {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::TradeWin => "trade_win",
            Self::TradeLoss => "trade_loss",
            Self::Bonus => "bonus",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(Self::Deposit),
            "withdrawal" => Some(Self::Withdrawal),
            "trade_win" => Some(Self::TradeWin),
            "trade_loss" => Some(Self::TradeLoss),
            "bonus" => Some(Self::Bonus),
            _ => None,
        }
    }
}

/// Lifecycle status of a transaction.
///
/// Deposits and withdrawals start `Pending` and move to `Completed` or
/// `Rejected` on admin review. Trade and bonus transactions are written
/// `Completed` by the ledger in the same database transaction that moves
/// the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Rejected,
}

impl TransactionStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_direction_roundtrip() {
        assert_eq!(TradeDirection::parse("up"), Some(TradeDirection::Up));
        assert_eq!(TradeDirection::parse("DOWN"), Some(TradeDirection::Down));
        assert_eq!(TradeDirection::parse("sideways"), None);
        assert_eq!(TradeDirection::Up.as_str(), "up");
    }

    #[test]
    fn trading_mode_default_is_normal() {
        assert_eq!(TradingMode::default(), TradingMode::Normal);
    }

    #[test]
    fn trading_mode_roundtrip() {
        for mode in [TradingMode::Normal, TradingMode::Win, TradingMode::Lose] {
            assert_eq!(TradingMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(TradingMode::parse("rigged"), None);
    }

    #[test]
    fn user_role_admin_check() {
        assert!(!UserRole::User.is_admin());
        assert!(UserRole::Admin.is_admin());
        assert!(UserRole::SuperAdmin.is_admin());
        assert_eq!(UserRole::parse("super_admin"), Some(UserRole::SuperAdmin));
    }

    #[test]
    fn transaction_kind_roundtrip() {
        for kind in [
            TransactionKind::Deposit,
            TransactionKind::Withdrawal,
            TransactionKind::TradeWin,
            TransactionKind::TradeLoss,
            TransactionKind::Bonus,
        ] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(
            TransactionStatus::parse("PENDING"),
            Some(TransactionStatus::Pending)
        );
        assert_eq!(UserStatus::parse("Banned"), Some(UserStatus::Banned));
        assert_eq!(
            TradeStatus::parse("Completed"),
            Some(TradeStatus::Completed)
        );
    }
}
