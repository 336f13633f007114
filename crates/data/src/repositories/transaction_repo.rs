//! Transaction repository.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::TransactionRecord;

const TX_COLUMNS: &str =
    "id, user_id, kind, amount, status, reference, created_at, reviewed_at, reviewed_by";

/// Repository for transaction operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a transaction record.
    ///
    /// Pending deposit and withdrawal requests are inserted here; completed
    /// transactions that move a balance are written by the ledger instead.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, record: &TransactionRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO transactions
                (id, user_id, kind, amount, status, reference, created_at, reviewed_at, reviewed_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.kind)
        .bind(record.amount)
        .bind(&record.status)
        .bind(&record.reference)
        .bind(record.created_at)
        .bind(record.reviewed_at)
        .bind(record.reviewed_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a transaction by ID.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<TransactionRecord>> {
        let record = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Queries a user's transactions, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransactionRecord>> {
        let records = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Queries pending transactions awaiting admin review, oldest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_pending(&self, limit: i64) -> Result<Vec<TransactionRecord>> {
        let records = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions WHERE status = 'pending' \
             ORDER BY created_at ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
