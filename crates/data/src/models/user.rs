//! User account data model.

use chrono::{DateTime, Utc};
use optiondesk_core::types::{TradingMode, UserRole, UserStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform user account.
///
/// `balance` is the authoritative cash balance and is only ever moved by the
/// ledger inside a database transaction.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Bcrypt hash; never serialized out through the API layer.
    pub password_hash: String,
    pub balance: Decimal,
    /// Role: "user", "admin", "super_admin".
    pub role: String,
    /// Standing: "active", "suspended", "banned".
    pub status: String,
    /// Settlement override: "normal", "win", "lose".
    pub trading_mode: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a new user account with a zero balance and default role.
    #[must_use]
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            balance: Decimal::ZERO,
            role: UserRole::User.as_str().to_string(),
            status: UserStatus::Active.as_str().to_string(),
            trading_mode: TradingMode::Normal.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Returns the parsed role, defaulting to `User` for unknown strings.
    #[must_use]
    pub fn parsed_role(&self) -> UserRole {
        UserRole::parse(&self.role).unwrap_or_default()
    }

    /// Returns the parsed account status, defaulting to `Active`.
    #[must_use]
    pub fn parsed_status(&self) -> UserStatus {
        UserStatus::parse(&self.status).unwrap_or_default()
    }

    /// Returns the parsed trading mode, defaulting to `Normal`.
    #[must_use]
    pub fn parsed_mode(&self) -> TradingMode {
        TradingMode::parse(&self.trading_mode).unwrap_or_default()
    }

    /// Returns true if the account may place trades and move funds.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.parsed_status() == UserStatus::Active
    }

    /// Returns true for admin and super-admin accounts.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.parsed_role().is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_defaults() {
        let user = UserRecord::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "$2b$12$hash".to_string(),
        );

        assert_eq!(user.balance, Decimal::ZERO);
        assert_eq!(user.role, "user");
        assert_eq!(user.status, "active");
        assert_eq!(user.trading_mode, "normal");
        assert!(user.is_active());
        assert!(!user.is_admin());
    }

    #[test]
    fn parsed_fields_fall_back_to_defaults() {
        let mut user = UserRecord::new(
            "bob".to_string(),
            "bob@example.com".to_string(),
            "hash".to_string(),
        );
        user.role = "???".to_string();
        user.status = "???".to_string();
        user.trading_mode = "???".to_string();

        assert_eq!(user.parsed_role(), UserRole::User);
        assert_eq!(user.parsed_status(), UserStatus::Active);
        assert_eq!(user.parsed_mode(), TradingMode::Normal);
    }

    #[test]
    fn admin_detection() {
        let mut user = UserRecord::new(
            "root".to_string(),
            "root@example.com".to_string(),
            "hash".to_string(),
        );
        user.role = UserRole::SuperAdmin.as_str().to_string();
        assert!(user.is_admin());
    }
}
