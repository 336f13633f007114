//! Redeem code repository.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::{RedeemClaimRecord, RedeemCodeRecord};

/// Repository for redeem code operations.
#[derive(Debug, Clone)]
pub struct RedeemCodeRepository {
    pool: PgPool,
}

impl RedeemCodeRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new redeem code.
    ///
    /// # Errors
    /// Returns an error if the database operation fails, including a
    /// duplicate code.
    pub async fn insert(&self, record: &RedeemCodeRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO redeem_codes (code, amount, max_claims, created_by, created_at, disabled)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&record.code)
        .bind(record.amount)
        .bind(record.max_claims)
        .bind(record.created_by)
        .bind(record.created_at)
        .bind(record.disabled)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a redeem code.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get(&self, code: &str) -> Result<Option<RedeemCodeRecord>> {
        let record = sqlx::query_as::<_, RedeemCodeRecord>(
            "SELECT code, amount, max_claims, created_by, created_at, disabled \
             FROM redeem_codes WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists all redeem codes, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<RedeemCodeRecord>> {
        let records = sqlx::query_as::<_, RedeemCodeRecord>(
            "SELECT code, amount, max_claims, created_by, created_at, disabled \
             FROM redeem_codes ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Disables a redeem code so it can no longer be claimed.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn disable(&self, code: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE redeem_codes SET disabled = TRUE WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Queries claims for a code, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_claims(&self, code: &str) -> Result<Vec<RedeemClaimRecord>> {
        let records = sqlx::query_as::<_, RedeemClaimRecord>(
            "SELECT code, user_id, claimed_at FROM redeem_claims \
             WHERE code = $1 ORDER BY claimed_at DESC",
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
