pub mod account;
pub mod admin;
pub mod auth;
pub mod trades;

use chrono::{DateTime, Utc};
use optiondesk_data::models::UserRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Pagination query parameters shared by list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    /// Returns (limit, offset) clamped to sane bounds.
    #[must_use]
    pub fn clamped(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// User payload returned by the API; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub balance: Decimal,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserView {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            balance: user.balance,
            role: user.role,
            status: user.status,
            created_at: user.created_at,
        }
    }
}

/// Admin-facing user payload, including the trading mode override.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserView {
    #[serde(flatten)]
    pub user: UserView,
    pub trading_mode: String,
}

impl From<UserRecord> for AdminUserView {
    fn from(user: UserRecord) -> Self {
        let trading_mode = user.trading_mode.clone();
        Self {
            user: user.into(),
            trading_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pagination_clamps() {
        let p = Pagination {
            limit: None,
            offset: None,
        };
        assert_eq!(p.clamped(), (50, 0));

        let p = Pagination {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(p.clamped(), (200, 0));

        let p = Pagination {
            limit: Some(0),
            offset: Some(25),
        };
        assert_eq!(p.clamped(), (1, 25));
    }

    #[test]
    fn user_view_drops_password_hash() {
        let mut user = UserRecord::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "secret-hash".to_string(),
        );
        user.balance = dec!(42);

        let view = UserView::from(user);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("alice"));
    }
}
