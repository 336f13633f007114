//! Trade repository.
//!
//! Read-side queries for trades. All writes that move money go through the
//! ledger so balance and trade state change together.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::TradeRecord;

const TRADE_COLUMNS: &str = "id, user_id, symbol, direction, stake, duration_secs, entry_price, \
     exit_price, payout_rate, status, outcome, profit, placed_at, expires_at, settled_at";

/// Repository for trade queries.
#[derive(Debug, Clone)]
pub struct TradeRepository {
    pool: PgPool,
}

impl TradeRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a trade by ID.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<TradeRecord>> {
        let record = sqlx::query_as::<_, TradeRecord>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Queries a user's trades, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TradeRecord>> {
        let records = sqlx::query_as::<_, TradeRecord>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE user_id = $1 \
             ORDER BY placed_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Queries a user's active trades.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_active_by_user(&self, user_id: Uuid) -> Result<Vec<TradeRecord>> {
        let records = sqlx::query_as::<_, TradeRecord>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE user_id = $1 AND status = 'active' \
             ORDER BY expires_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Queries active trades whose expiry time has passed.
    ///
    /// The expiry scheduler polls this to find trades due for settlement,
    /// including trades that expired while the server was down.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_due(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<TradeRecord>> {
        let records = sqlx::query_as::<_, TradeRecord>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE status = 'active' AND expires_at <= $1 \
             ORDER BY expires_at ASC LIMIT $2"
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Queries recent trades across all users for the admin dashboard.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_recent(&self, limit: i64) -> Result<Vec<TradeRecord>> {
        let records = sqlx::query_as::<_, TradeRecord>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades ORDER BY placed_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Counts a user's trades by status.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count_by_user(&self, user_id: Uuid, status: &str) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM trades WHERE user_id = $1 AND status = $2")
                .bind(user_id)
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

        Ok(row.0)
    }
}
